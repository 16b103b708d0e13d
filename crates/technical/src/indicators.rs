//! Pure indicator math (Glossary): SMA, EMA, RSI, MACD, Bollinger Bands.
//! Every function takes a slice of closing prices ordered oldest-to-newest.

pub fn sma(closes: &[f64], n: usize) -> Option<f64> {
    if closes.len() < n || n == 0 {
        return None;
    }
    let window = &closes[closes.len() - n..];
    Some(window.iter().sum::<f64>() / n as f64)
}

/// EMA(n) with smoothing 2/(n+1), seeded by the SMA of the first `n`
/// values (Glossary). Returns the EMA series aligned to `closes[n-1..]`.
pub fn ema_series(closes: &[f64], n: usize) -> Vec<f64> {
    if closes.len() < n || n == 0 {
        return Vec::new();
    }
    let k = 2.0 / (n as f64 + 1.0);
    let seed = closes[..n].iter().sum::<f64>() / n as f64;
    let mut out = Vec::with_capacity(closes.len() - n + 1);
    out.push(seed);
    let mut prev = seed;
    for &price in &closes[n..] {
        let next = price * k + prev * (1.0 - k);
        out.push(next);
        prev = next;
    }
    out
}

pub fn ema(closes: &[f64], n: usize) -> Option<f64> {
    ema_series(closes, n).last().copied()
}

/// RSI(n): 100 - 100/(1+avg_gain/avg_loss) over the last n periods;
/// avg_loss=0 => 100 (Glossary).
pub fn rsi(closes: &[f64], n: usize) -> Option<f64> {
    if closes.len() < n + 1 {
        return None;
    }
    let window = &closes[closes.len() - n - 1..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let avg_gain = gains / n as f64;
    let avg_loss = losses / n as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD(12,26,9): EMA(12)-EMA(26); signal=EMA(9) of the MACD line;
/// histogram=MACD-signal (Glossary).
pub fn macd(closes: &[f64]) -> Option<Macd> {
    if closes.len() < 35 {
        return None;
    }
    let ema12 = ema_series(closes, 12);
    let ema26 = ema_series(closes, 26);
    // ema12 is 14 entries longer than ema26 (26-12); align to ema26's start.
    let offset = ema12.len() - ema26.len();
    let macd_line: Vec<f64> = ema26
        .iter()
        .enumerate()
        .map(|(i, &slow)| ema12[i + offset] - slow)
        .collect();
    if macd_line.len() < 9 {
        return None;
    }
    let signal_series = ema_series(&macd_line, 9);
    let signal = *signal_series.last()?;
    let macd_value = *macd_line.last()?;
    Some(Macd {
        macd: macd_value,
        signal,
        histogram: macd_value - signal,
    })
}

pub struct BollingerBands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Bollinger Bands(n, k): middle=SMA(n), upper/lower = middle +/- k*sigma
/// (Glossary; k=2 per spec's "20, 2 sigma").
pub fn bollinger_bands(closes: &[f64], n: usize, k: f64) -> Option<BollingerBands> {
    let middle = sma(closes, n)?;
    let window = &closes[closes.len() - n..];
    let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / n as f64;
    let sigma = variance.sqrt();
    Some(BollingerBands {
        middle,
        upper: middle + k * sigma,
        lower: middle - k * sigma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize, start: f64, step: f64) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn sma_averages_the_trailing_window() {
        let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&closes, 3), Some(4.0));
        assert_eq!(sma(&closes, 10), None);
    }

    #[test]
    fn rsi_is_100_when_avg_loss_is_zero() {
        let closes = series(20, 10.0, 1.0); // strictly increasing
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_is_bounded() {
        let closes = vec![
            44.0, 44.5, 43.5, 44.8, 45.2, 44.9, 45.6, 46.1, 45.8, 46.5, 46.9, 47.2, 46.8, 47.5,
            48.0,
        ];
        let value = rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn bollinger_middle_is_sma() {
        let closes = vec![10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 10.0];
        let bands = bollinger_bands(&closes, 10, 2.0).unwrap();
        assert!(bands.upper > bands.middle);
        assert!(bands.lower < bands.middle);
    }

    #[test]
    fn macd_needs_enough_history() {
        let closes = series(20, 10.0, 0.1);
        assert!(macd(&closes).is_none());
        let closes = series(60, 10.0, 0.1);
        assert!(macd(&closes).is_some());
    }
}
