//! Property-based tests for rust_leveled_log using proptest

use chrono::{Local, TimeZone};
use proptest::prelude::*;
use rust_leveled_log::core::caller::basename;
use rust_leveled_log::prelude::*;
use rust_leveled_log::{format_line, format_timestamp};
use std::str::FromStr;
use std::sync::Arc;

fn any_severity() -> impl Strategy<Value = Severity> {
    (0usize..Severity::ALL.len()).prop_map(|i| Severity::ALL[i])
}

/// Severities a leveled call can use without panicking or exiting
fn returning_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Debug),
        Just(Severity::Info),
        Just(Severity::Warn),
        Just(Severity::Error),
    ]
}

fn path_segment() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

// ============================================================================
// Severity Tests
// ============================================================================

proptest! {
    /// Ordering follows the numeric rank
    #[test]
    fn test_severity_ordering(a in any_severity(), b in any_severity()) {
        prop_assert_eq!(a.passes(b), a.rank() >= b.rank());
        prop_assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
    }

    /// Labels are always five characters wide
    #[test]
    fn test_label_width(level in any_severity()) {
        prop_assert_eq!(level.label().len(), 5);
        prop_assert_eq!(level.label().trim_start(), level.as_str());
    }

    /// Names parse back case-insensitively
    #[test]
    fn test_name_roundtrip(level in any_severity(), upper in any::<bool>()) {
        let name = if upper {
            level.as_str().to_uppercase()
        } else {
            level.as_str().to_lowercase()
        };
        prop_assert_eq!(Severity::from_str(&name).unwrap(), level);
    }

    /// Only ranks 0..=7 convert
    #[test]
    fn test_numeric_range(value in -100i64..100) {
        let result = Severity::try_from(value);
        prop_assert_eq!(result.is_ok(), (0..=7).contains(&value));
        if let Ok(level) = result {
            prop_assert_eq!(i64::from(level.rank()), value);
        }
    }
}

// ============================================================================
// Threshold Tests
// ============================================================================

proptest! {
    /// A leveled call is emitted iff its rank reaches the threshold
    #[test]
    fn test_threshold_law(threshold in any_severity(), levels in prop::collection::vec(returning_severity(), 0..20)) {
        let memory = Arc::new(MemorySink::new());
        let logger = Logger::builder()
            .level(threshold)
            .no_output()
            .record_sink(Arc::clone(&memory))
            .build();

        for level in &levels {
            logger.log(*level, "m");
        }

        let expected: Vec<Severity> = levels
            .iter()
            .copied()
            .filter(|level| level.rank() >= threshold.rank() && threshold != Severity::None)
            .collect();
        let delivered: Vec<Severity> = memory.snapshots().iter().map(|s| s.level).collect();
        prop_assert_eq!(delivered, expected);
    }

    /// Print calls ignore the threshold
    #[test]
    fn test_prints_always_emit(threshold in any_severity(), message in "[^\n]{0,40}") {
        let memory = Arc::new(MemorySink::new());
        let logger = Logger::builder()
            .level(threshold)
            .no_output()
            .record_sink(Arc::clone(&memory))
            .build();

        logger.print(&message);

        let snapshots = memory.snapshots();
        prop_assert_eq!(snapshots.len(), 1);
        prop_assert_eq!(snapshots[0].level, Severity::Print);
        prop_assert!(snapshots[0].timestamp.is_none());
        prop_assert_eq!(&snapshots[0].message, &message);
    }
}

// ============================================================================
// Path Tests
// ============================================================================

proptest! {
    /// A registered root is removed from paths below it
    #[test]
    fn test_strip_registered_root(
        root in prop::collection::vec(path_segment(), 1..4),
        rel in prop::collection::vec(path_segment(), 1..4),
    ) {
        let root = format!("/{}", root.join("/"));
        let rel = rel.join("/");
        let roots = SourceRoots::from_paths([root.as_str()]);

        prop_assert_eq!(roots.strip(&format!("{root}/{rel}")), rel);
    }

    /// Paths outside every root are returned unchanged
    #[test]
    fn test_strip_leaves_foreign_paths(segments in prop::collection::vec(path_segment(), 1..5)) {
        let roots = SourceRoots::from_paths(["/nonexistent-root"]);
        let path = format!("/{}", segments.join("/"));
        prop_assert_eq!(roots.strip(&path), path);
    }

    /// The most specific root wins regardless of registration order
    #[test]
    fn test_longest_root_first(
        base in prop::collection::vec(path_segment(), 1..3),
        extra in path_segment(),
        file in path_segment(),
        reversed in any::<bool>(),
    ) {
        let short = format!("/{}", base.join("/"));
        let long = format!("{short}/{extra}");
        let roots = if reversed {
            SourceRoots::from_paths([long.as_str(), short.as_str()])
        } else {
            SourceRoots::from_paths([short.as_str(), long.as_str()])
        };

        prop_assert_eq!(roots.strip(&format!("{long}/{file}")), file);
    }

    /// Basenames never contain a separator
    #[test]
    fn test_basename(segments in prop::collection::vec(path_segment(), 1..5)) {
        let path = segments.join("/");
        let base = basename(&path);
        prop_assert!(!base.contains('/'));
        prop_assert_eq!(base, segments.last().unwrap().as_str());
    }
}

// ============================================================================
// Formatting Tests
// ============================================================================

proptest! {
    /// Line layout is a pure function of its parts
    #[test]
    fn test_format_line_layout(
        level in returning_severity(),
        file in path_segment(),
        line in 1i64..100_000,
        message in "[^\n]{0,60}",
    ) {
        let site = CallSite::new(format!("{file}.rs"), line);
        let formatted = format_line("TS", level, &site, &message);

        prop_assert_eq!(
            &formatted,
            &format!("TS [{}] [{}.rs:{}] {}", level.label(), file, line, message)
        );
        prop_assert_eq!(formatted.clone(), format_line("TS", level, &site, &message));
    }

    /// Arbitrary layouts never panic
    #[test]
    fn test_format_timestamp_never_panics(layout in ".{0,20}", secs in 0i64..4_000_000_000) {
        let timestamp = Local.timestamp_opt(secs, 0).single();
        prop_assume!(timestamp.is_some());
        let _ = format_timestamp(&timestamp.unwrap(), &layout);
    }

    /// Records serialize with their resolved call site
    #[test]
    fn test_record_json(level in returning_severity(), message in ".{0,40}", line in 1i64..10_000) {
        let record = Record::new(level, message.clone()).with_call_site(CallSite::new("p.rs", line));
        let value: serde_json::Value = serde_json::to_value(&record).unwrap();

        prop_assert_eq!(value["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(value["line"].as_i64(), Some(line));
        prop_assert_eq!(value["file"].as_str(), Some("p.rs"));
    }
}
