//! RSI (Relative Strength Index) indicator.
//!
//! Uses a simple rolling mean of gains and losses over the last n price
//! changes (not Wilder's smoothing):
//! - avg_gain = mean(max(ΔC, 0)), avg_loss = mean(max(-ΔC, 0))
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - avg_loss == 0: RSI = 100, or 50 when there was no movement at all
//!
//! Warmup: first n bars are undefined (need n price changes).

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return values;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    // gains[j] is the change into bar j+1, so bar i sees gains[i-period..i].
    for (i, value) in values.iter_mut().enumerate().skip(period) {
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;
        *value = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
