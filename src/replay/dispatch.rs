//! Replay message dispatch: parse s-expressions and drive the engine.

use anyhow::{bail, ensure, Context};
use lexpr::Value;
use tracing::{debug, warn};

use crate::gesture::engine::GestureEngine;
use crate::gesture::landmarks::{FrameSample, Landmark};
use crate::gesture::sink::InteractionEvent;

/// Engine driven by the replay: events are recorded and drained per message.
pub type ReplayEngine = GestureEngine<Vec<InteractionEvent>>;

/// Output produced by one input line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outcome {
    /// Formatted engine events, in dispatch order.
    pub events: Vec<String>,
    /// Response to a query or an error report.
    pub response: Option<String>,
    pub failed: bool,
}

impl Outcome {
    fn error(msg_id: i64, reason: &str) -> Self {
        Self {
            response: Some(error_response(msg_id, reason)),
            failed: true,
            ..Default::default()
        }
    }

    /// All output lines, events first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .map(String::as_str)
            .chain(self.response.as_deref())
    }
}

/// Parse one message and apply it to the engine.
pub fn handle_message(engine: &mut ReplayEngine, raw: &str) -> Outcome {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Outcome::error(0, &format!("malformed s-expression: {e}"));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    let result = match msg_type.as_deref() {
        Some("frame") => handle_frame(engine, &value),
        Some("no-hand") => handle_no_hand(engine, &value),
        Some("tick") => handle_tick(engine, &value),
        Some("gesture-status") => Ok(handle_gesture_status(engine, msg_id)),
        Some("gesture-config") => handle_gesture_config(engine, msg_id, &value),
        Some("dispose") => Ok(handle_dispose(engine, msg_id)),
        Some(other) => Err(anyhow::anyhow!("unknown message type: {}", other)),
        None => Err(anyhow::anyhow!("missing :type")),
    };

    result.unwrap_or_else(|e| {
        warn!("replay message rejected: {:#}", e);
        Outcome::error(msg_id, &format!("{:#}", e))
    })
}

// ── Handlers ───────────────────────────────────────────────

fn handle_frame(engine: &mut ReplayEngine, value: &Value) -> anyhow::Result<Outcome> {
    let t = require_time(value)?;
    let landmarks = get_value(value, "landmarks").context("missing :landmarks")?;
    let frame = parse_landmarks(landmarks)?;

    let mut outcome = Outcome::default();
    advance(engine, t, &mut outcome);
    engine.process(Some(&frame), t);
    drain(engine, t, &mut outcome);
    Ok(outcome)
}

fn handle_no_hand(engine: &mut ReplayEngine, value: &Value) -> anyhow::Result<Outcome> {
    let t = require_time(value)?;
    let mut outcome = Outcome::default();
    advance(engine, t, &mut outcome);
    engine.process(None, t);
    Ok(outcome)
}

fn handle_tick(engine: &mut ReplayEngine, value: &Value) -> anyhow::Result<Outcome> {
    let t = require_time(value)?;
    let mut outcome = Outcome::default();
    advance(engine, t, &mut outcome);
    Ok(outcome)
}

fn handle_gesture_status(engine: &ReplayEngine, msg_id: i64) -> Outcome {
    Outcome {
        response: Some(format!(
            "(:type :response :id {} :status :ok :gesture {})",
            msg_id,
            engine.status_sexp()
        )),
        ..Default::default()
    }
}

fn handle_gesture_config(
    engine: &mut ReplayEngine,
    msg_id: i64,
    value: &Value,
) -> anyhow::Result<Outcome> {
    let debounce = get_float(value, "debounce-ms");
    let threshold = get_float(value, "edge-threshold");
    let interval = get_float(value, "edge-scroll-interval-ms");
    let debug_mode = get_bool(value, "debug");

    if let Some(ms) = debounce {
        ensure!(ms >= 0.0, "debounce-ms must be non-negative, got {}", ms);
    }
    if let Some(t) = threshold {
        ensure!(
            (0.0..=0.5).contains(&t),
            "edge-threshold must be within 0..0.5, got {}",
            t
        );
    }
    if let Some(ms) = interval {
        ensure!(ms > 0.0, "edge-scroll-interval-ms must be positive, got {}", ms);
    }

    engine.update_config(|c| {
        if let Some(ms) = debounce {
            c.debounce_ms = ms;
        }
        if let Some(t) = threshold {
            c.edge_threshold = t;
        }
        if let Some(ms) = interval {
            c.edge_scroll_interval_ms = ms;
        }
        if let Some(on) = debug_mode {
            c.debug = on;
        }
    });
    debug!("gesture config updated: {}", engine.config_sexp());

    Ok(Outcome {
        response: Some(format!(
            "(:type :response :id {} :status :ok :config {})",
            msg_id,
            engine.config_sexp()
        )),
        ..Default::default()
    })
}

fn handle_dispose(engine: &mut ReplayEngine, msg_id: i64) -> Outcome {
    engine.dispose();
    Outcome {
        response: Some(ok_response(msg_id)),
        ..Default::default()
    }
}

// ── Engine driving ─────────────────────────────────────────

/// Fire every edge-scroll repeat due up to `now_ms`, each at its own deadline.
fn advance(engine: &mut ReplayEngine, now_ms: f64, outcome: &mut Outcome) {
    while let Some(deadline) = engine.next_deadline() {
        if deadline > now_ms {
            break;
        }
        engine.tick(deadline);
        drain(engine, deadline, outcome);
        if engine.next_deadline().map_or(true, |next| next <= deadline) {
            break;
        }
    }
}

fn drain(engine: &mut ReplayEngine, t: f64, outcome: &mut Outcome) {
    outcome
        .events
        .extend(engine.sink_mut().drain(..).map(|e| format_interaction(&e, t)));
}

/// Format an engine event, stamped with the time it was dispatched.
pub fn format_interaction(event: &InteractionEvent, t: f64) -> String {
    let t = format!("{:.0}", t);
    match event {
        InteractionEvent::GestureChange { gesture, previous } => {
            let gesture = format!(":{}", gesture.as_str());
            let previous = format!(":{}", previous.as_str());
            format_event(
                event.name(),
                &[
                    ("t", t.as_str()),
                    ("gesture", gesture.as_str()),
                    ("previous", previous.as_str()),
                ],
            )
        }
        InteractionEvent::IndexUp | InteractionEvent::Ok => {
            format_event(event.name(), &[("t", t.as_str())])
        }
        InteractionEvent::PositionUpdate { x } => {
            let x = format!("{:.3}", x);
            format_event(event.name(), &[("t", t.as_str()), ("x", x.as_str())])
        }
        InteractionEvent::EdgeScroll { direction } => {
            let direction = format!(":{}", direction.as_str());
            format_event(
                event.name(),
                &[("t", t.as_str()), ("direction", direction.as_str())],
            )
        }
    }
}

// ── Parsing helpers ────────────────────────────────────────

fn require_time(value: &Value) -> anyhow::Result<f64> {
    let Some(raw) = get_keyword(value, "t") else {
        bail!("missing :t");
    };
    let t: f64 = raw
        .parse()
        .with_context(|| format!("invalid :t value {:?}", raw))?;
    ensure!(t.is_finite(), "invalid :t value {:?}", raw);
    Ok(t)
}

/// Read a `((x y z) ...)` list into a frame.
fn parse_landmarks(value: &Value) -> anyhow::Result<FrameSample> {
    let numbers = flatten_list(value)
        .into_iter()
        .map(|v| match v {
            Value::Number(n) => n
                .as_f64()
                .with_context(|| format!("landmark coordinate out of range: {}", n)),
            other => bail!("landmark coordinate is not a number: {}", other),
        })
        .collect::<anyhow::Result<Vec<f64>>>()?;

    ensure!(
        numbers.len() % 3 == 0,
        "landmark coordinates must come in (x y z) triples, got {} numbers",
        numbers.len()
    );
    let landmarks: Vec<Landmark> = numbers
        .chunks_exact(3)
        .map(|c| Landmark::new(c[0], c[1], c[2]))
        .collect();
    FrameSample::from_slice(&landmarks)
}

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Find the raw value following `:key` in a plist.
/// Accepts both `Value::Keyword("key")` and `Value::Symbol(":key")`.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a scalar plist value as a string.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "t" } else { "nil" }).to_string(),
        Value::Null => "nil".to_string(),
        _ => val.to_string(),
    })
}

fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Treats "nil" as false, anything else as true.
fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Flatten a possibly nested list into its leaf values.
fn flatten_list(value: &Value) -> Vec<&Value> {
    let mut result = Vec::new();
    fn walk<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
        match v {
            Value::Cons(pair) => {
                walk(pair.car(), out);
                walk(pair.cdr(), out);
            }
            Value::Null => {}
            other => out.push(other),
        }
    }
    walk(value, &mut result);
    result
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::fixtures;

    fn frame_message(frame: &FrameSample, t: f64) -> String {
        let points: Vec<String> = frame
            .landmarks()
            .iter()
            .map(|p| format!("({} {} {})", p.x, p.y, p.z))
            .collect();
        format!("(:type frame :t {} :landmarks ({}))", t, points.join(" "))
    }

    fn engine() -> ReplayEngine {
        GestureEngine::new(Vec::new())
    }

    // ── plist helpers ───────────────────────────────────────

    #[test]
    fn test_get_keyword_from_plist() {
        let v = lexpr::from_str("(:type frame :t 33)").unwrap();
        assert_eq!(get_keyword(&v, "type"), Some("frame".to_string()));
        assert_eq!(get_keyword(&v, "t"), Some("33".to_string()));
        assert_eq!(get_keyword(&v, "landmarks"), None);
    }

    #[test]
    fn test_get_bool() {
        let v = lexpr::from_str("(:debug t :other nil)").unwrap();
        assert_eq!(get_bool(&v, "debug"), Some(true));
        assert_eq!(get_bool(&v, "other"), Some(false));
    }

    #[test]
    fn test_get_float() {
        let v = lexpr::from_str("(:edge-threshold 0.2 :debounce-ms 250)").unwrap();
        assert_eq!(get_float(&v, "edge-threshold"), Some(0.2));
        assert_eq!(get_float(&v, "debounce-ms"), Some(250.0));
    }

    #[test]
    fn test_error_response_escapes_quotes() {
        let r = error_response(3, "bad \"value\"");
        assert!(r.contains(":id 3"));
        assert!(r.contains(":status :error"));
        assert!(r.contains("bad \\\"value\\\""));
    }

    #[test]
    fn test_format_event_with_fields() {
        let e = format_event("edge-scroll", &[("t", "200"), ("direction", ":left")]);
        assert_eq!(e, "(:type :event :event :edge-scroll :t 200 :direction :left)");
    }

    #[test]
    fn test_parse_landmarks() {
        let msg = frame_message(&fixtures::fist(), 0.0);
        let v = lexpr::from_str(&msg).unwrap();
        let frame = parse_landmarks(get_value(&v, "landmarks").unwrap()).unwrap();
        for (got, want) in frame.landmarks().iter().zip(fixtures::fist().landmarks()) {
            assert!((got.x - want.x).abs() < 1e-12);
            assert!((got.y - want.y).abs() < 1e-12);
            assert!((got.z - want.z).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parse_landmarks_wrong_count() {
        let v = lexpr::from_str("((0.1 0.2 0.0) (0.3 0.4 0.0))").unwrap();
        let err = parse_landmarks(&v).unwrap_err();
        assert!(err.to_string().contains("expected 21 landmarks, got 2"));
    }

    #[test]
    fn test_parse_landmarks_not_triples() {
        let v = lexpr::from_str("((0.1 0.2) (0.3 0.4))").unwrap();
        assert!(parse_landmarks(&v).is_err());
    }

    // ── messages ────────────────────────────────────────────

    #[test]
    fn test_frame_message_emits_events() {
        let mut e = engine();
        let out = handle_message(&mut e, &frame_message(&fixtures::ok_sign(), 40.0));
        assert!(!out.failed);
        assert_eq!(out.events, vec!["(:type :event :event :ok :t 40)".to_string()]);
        assert!(out.response.is_none());
        assert!(e.sink().is_empty(), "events are drained");
    }

    #[test]
    fn test_tick_fires_due_repeats() {
        let mut e = engine();
        let left = fixtures::at_palm_x(&fixtures::open_hand(), 0.9);
        let out = handle_message(&mut e, &frame_message(&left, 0.0));
        assert_eq!(
            out.events[0],
            "(:type :event :event :edge-scroll :t 0 :direction :left)"
        );

        let out = handle_message(&mut e, "(:type tick :t 650)");
        assert_eq!(
            out.events,
            vec![
                "(:type :event :event :edge-scroll :t 200 :direction :left)".to_string(),
                "(:type :event :event :edge-scroll :t 400 :direction :left)".to_string(),
                "(:type :event :event :edge-scroll :t 600 :direction :left)".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_hand_keeps_state() {
        let mut e = engine();
        handle_message(&mut e, &frame_message(&fixtures::fist(), 0.0));
        let out = handle_message(&mut e, "(:type no-hand :t 100)");
        assert!(out.events.is_empty());
        assert!(!out.failed);
        assert_eq!(e.frames_processed(), 1);
    }

    #[test]
    fn test_gesture_status() {
        let mut e = engine();
        handle_message(&mut e, &frame_message(&fixtures::fist(), 0.0));
        let out = handle_message(&mut e, "(:type gesture-status :id 7)");
        let r = out.response.unwrap();
        assert!(r.starts_with("(:type :response :id 7 :status :ok :gesture ("));
        assert!(r.contains(":gesture :closed"));
    }

    #[test]
    fn test_gesture_config() {
        let mut e = engine();
        let out = handle_message(
            &mut e,
            "(:type gesture-config :debounce-ms 250 :edge-threshold 0.2 :debug t)",
        );
        assert!(!out.failed);
        assert!(out.response.unwrap().contains(":debounce-ms 250"));
        assert_eq!(e.config().debounce_ms, 250.0);
        assert_eq!(e.config().edge_threshold, 0.2);
        assert!(e.config().debug);
        assert_eq!(e.config().edge_scroll_interval_ms, 200.0);
    }

    #[test]
    fn test_gesture_config_rejects_bad_values() {
        let mut e = engine();
        let out = handle_message(&mut e, "(:type gesture-config :edge-scroll-interval-ms 0)");
        assert!(out.failed);
        assert!(out.response.unwrap().contains("must be positive"));
        assert_eq!(e.config().edge_scroll_interval_ms, 200.0);
    }

    #[test]
    fn test_dispose_message() {
        let mut e = engine();
        let out = handle_message(&mut e, "(:type dispose :id 2)");
        assert_eq!(out.response.as_deref(), Some("(:type :response :id 2 :status :ok)"));
        assert!(e.is_disposed());
        let out = handle_message(&mut e, &frame_message(&fixtures::ok_sign(), 1000.0));
        assert!(out.events.is_empty());
        assert!(!out.failed);
    }

    #[test]
    fn test_malformed_lines_report_errors() {
        let mut e = engine();
        for raw in [
            "(:type frame",
            "(:type warp :t 1)",
            "(:t 5)",
            "(:type tick)",
            "(:type frame :t 0 :landmarks ((0.1 0.2 0.0)))",
            "(:type frame :t 0 :landmarks ((a b c)))",
        ] {
            let out = handle_message(&mut e, raw);
            assert!(out.failed, "{} should fail", raw);
            assert!(out.response.unwrap().contains(":status :error"));
        }
        assert_eq!(e.frames_processed(), 0);
    }

    #[test]
    fn test_outcome_lines_order() {
        let out = Outcome {
            events: vec!["a".to_string(), "b".to_string()],
            response: Some("c".to_string()),
            failed: false,
        };
        assert_eq!(out.lines().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
