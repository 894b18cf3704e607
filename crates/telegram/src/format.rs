//! Message text for alerts and operator replies.

use chrono::{DateTime, Utc};

use common::{Alert, CycleSummary, EngineState, Signal, Subscriptions};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render an alert for chat delivery.
pub fn format_alert(symbol: &str, alert: &Alert, at: DateTime<Utc>) -> String {
    let header = format!(
        "Signal | {symbol}\n{} UTC",
        at.format(TIMESTAMP_FORMAT)
    );
    let body = match alert {
        Alert::Trade(signal) => format_signal(signal),
        Alert::Watch(watch) => watch.to_string(),
    };
    format!("{header}\n\n{body}")
}

/// Render the `/test` message. Carries no market data so it cannot be
/// mistaken for a live alert.
pub fn format_test_alert(at: DateTime<Utc>) -> String {
    format!(
        "Test alert | fxsignal\n{} UTC\n\n\
         This is a test message. Delivery to this chat works; no market signal was generated.",
        at.format(TIMESTAMP_FORMAT)
    )
}

fn format_signal(s: &Signal) -> String {
    let rr = match s.risk_reward_ratio {
        Some(r) => format!("{r:.2}"),
        None => "n/a".to_string(),
    };
    format!(
        "{dir} @ {entry:.5}\n\
         Stop-loss: {sl:.5}\n\
         Take-profit: {tp:.5}\n\
         R:R {rr}\n\
         RSI {rsi:.2} | MACD hist {hp:.5} -> {h:.5}\n\
         EMA200 {ema:.5} | ATR {atr:.5}",
        dir = s.direction,
        entry = s.entry,
        sl = s.stop_loss,
        tp = s.take_profit,
        rsi = s.rsi,
        hp = s.macd_hist_prev,
        h = s.macd_hist,
        ema = s.ema200,
        atr = s.atr,
    )
}

/// What `/status` replies with.
pub struct StatusView<'a> {
    pub state: EngineState,
    pub strategy: &'a str,
    pub interval_minutes: u64,
    pub subs: &'a Subscriptions,
    pub last_cycle: Option<&'a CycleSummary>,
    pub chat_id: i64,
}

pub fn format_status(v: &StatusView<'_>) -> String {
    let subscribed = if v.subs.chats.contains(&v.chat_id) {
        "you are subscribed"
    } else {
        "you are not subscribed"
    };

    let mut text = format!(
        "FX Signal Status\n\
         Engine: {}\n\
         Strategy: {}\n\
         Checks: every {} min on {} bars\n\
         Pairs: {}\n\
         Subscribers: {} ({subscribed})",
        v.state,
        v.strategy,
        v.interval_minutes,
        v.subs.interval,
        v.subs.pairs.join(", "),
        v.subs.chats.len(),
    );

    match v.last_cycle {
        Some(c) => {
            text.push_str(&format!(
                "\nLast check: {} UTC, {} symbols, {} alerts",
                c.finished_at.format(TIMESTAMP_FORMAT),
                c.symbols,
                c.alerts
            ));
            if !c.failures.is_empty() {
                text.push_str(&format!(", failed: {}", c.failures.join(", ")));
            }
            if c.cancelled {
                text.push_str(" (cancelled)");
            }
        }
        None => text.push_str("\nLast check: none yet"),
    }
    text
}

/// Split `/pairs` arguments on whitespace and commas.
pub fn parse_pairs(args: &str) -> Vec<String> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::{Direction, RsiWatch, TriggerReadings};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 42).unwrap()
    }

    fn buy() -> Signal {
        Signal {
            direction: Direction::Buy,
            entry: 1.0812,
            stop_loss: 1.0795,
            take_profit: 1.0846,
            risk_reward_ratio: Some(2.0),
            rsi: 22.41,
            macd_hist_prev: -0.00002,
            macd_hist: 0.00001,
            ema200: 1.0701,
            atr: 0.00113,
            raw: TriggerReadings {
                close: 1.0812,
                rsi: 22.4137,
                macd_hist_prev: -0.0000213,
                macd_hist: 0.0000104,
                ema200: 1.07012,
                atr: 0.0011337,
            },
        }
    }

    #[test]
    fn trade_alert_has_header_and_levels() {
        let text = format_alert("EURUSD", &Alert::Trade(buy()), at());
        assert!(text.starts_with("Signal | EURUSD\n2024-03-01 10:05 UTC\n\n"), "{text}");
        assert!(text.contains("BUY @ 1.08120"));
        assert!(text.contains("Stop-loss: 1.07950"));
        assert!(text.contains("Take-profit: 1.08460"));
        assert!(text.contains("R:R 2.00"));
        assert!(text.contains("RSI 22.41"));
    }

    #[test]
    fn missing_ratio_renders_as_na() {
        let mut s = buy();
        s.risk_reward_ratio = None;
        let text = format_alert("EURUSD", &Alert::Trade(s), at());
        assert!(text.contains("R:R n/a"));
    }

    #[test]
    fn watch_alert_uses_its_description() {
        let alert = Alert::Watch(RsiWatch::CrossUp { from: 28.44, to: 31.2 });
        let text = format_alert("GBPUSD", &alert, at());
        assert!(text.ends_with("RSI cross-up from 28.4 to 31.2 -> possible BUY"), "{text}");
    }

    #[test]
    fn test_alert_is_marked_and_carries_no_direction() {
        let text = format_test_alert(at());
        assert!(text.starts_with("Test alert | fxsignal\n2024-03-01 10:05 UTC\n\n"), "{text}");
        assert!(text.contains("test message"));
        assert!(!text.contains("Signal |"));
        assert!(!text.contains("BUY"));
        assert!(!text.contains("SELL"));
        assert!(!text.contains("RSI"));
    }

    #[test]
    fn status_without_history() {
        let subs = Subscriptions {
            chats: vec![1, 2],
            ..Subscriptions::default()
        };
        let text = format_status(&StatusView {
            state: EngineState::Running,
            strategy: "EMA200 + RSI + MACD",
            interval_minutes: 5,
            subs: &subs,
            last_cycle: None,
            chat_id: 2,
        });
        assert!(text.contains("Engine: running"));
        assert!(text.contains("Pairs: EURUSD, GBPUSD, USDJPY"));
        assert!(text.contains("Subscribers: 2 (you are subscribed)"));
        assert!(text.contains("Last check: none yet"));
    }

    #[test]
    fn status_reports_failures() {
        let subs = Subscriptions::default();
        let cycle = CycleSummary {
            finished_at: at(),
            symbols: 3,
            alerts: 1,
            failures: vec!["GBPUSD".into()],
            cancelled: false,
        };
        let text = format_status(&StatusView {
            state: EngineState::Paused,
            strategy: "RSI 14 (30/70)",
            interval_minutes: 15,
            subs: &subs,
            last_cycle: Some(&cycle),
            chat_id: 9,
        });
        assert!(text.contains("you are not subscribed"));
        assert!(text.contains("Last check: 2024-03-01 10:05 UTC, 3 symbols, 1 alerts, failed: GBPUSD"));
    }

    #[test]
    fn pairs_split_on_spaces_and_commas() {
        assert_eq!(parse_pairs(" eurusd, GBPUSD  usdjpy,"), vec!["eurusd", "GBPUSD", "usdjpy"]);
        assert!(parse_pairs("   ").is_empty());
    }
}
