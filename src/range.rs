//! Range and scale point normalization for control and CV ports.
//!
//! The numeric domain of a port is decided once from its `integer`
//! property. Every declared number (minimum, maximum, default, scale point
//! values) is then coerced into that domain with [`coerce`], a pure
//! function over [`Number`] that reports how the written representation
//! disagreed with the domain. The port-level pass turns those reports into
//! diagnostics and repairs the range so that `minimum < maximum` and
//! `minimum <= default <= maximum` always hold afterwards.

use std::cmp::Ordering;
use std::fmt;

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::{PortDescriptor, RangeSpec, ScalePoint};
use crate::repository::Number;

/// Sample rate assumed when checking defaults of `sampleRate` ports, whose
/// bounds are expressed as a fraction of the sample rate.
pub const REFERENCE_SAMPLE_RATE: i64 = 48_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Integer,
    Real,
}

impl Domain {
    pub fn of(port: &PortDescriptor) -> Self {
        if port.has_property("integer") {
            Domain::Integer
        } else {
            Domain::Real
        }
    }
}

/// How a written number disagreed with the port's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionIssue {
    /// Integer domain, written as a real without fractional part. Lossless.
    RealWithoutFraction,
    /// Integer domain, written as a real with a fractional part. The
    /// fraction is truncated.
    FractionDiscarded,
    /// Real domain, written as an integer. Lossless.
    WrittenAsInteger,
    /// Integer domain, written as a real beyond the `i64` range. The value
    /// saturates at the nearest bound.
    IntegerOverflow,
}

/// Converts `value` into `domain`.
pub fn coerce(value: Number, domain: Domain) -> (Number, Option<CoercionIssue>) {
    match (domain, value) {
        (Domain::Integer, Number::Integer(_)) | (Domain::Real, Number::Real(_)) => (value, None),
        (Domain::Integer, Number::Real(real)) => {
            let issue = if !(i64::MIN as f64..i64::MAX as f64).contains(&real.trunc()) {
                CoercionIssue::IntegerOverflow
            } else if real.fract() == 0.0 {
                CoercionIssue::RealWithoutFraction
            } else {
                CoercionIssue::FractionDiscarded
            };
            (Number::Integer(real.trunc() as i64), Some(issue))
        }
        (Domain::Real, Number::Integer(int)) => {
            (Number::Real(int as f64), Some(CoercionIssue::WrittenAsInteger))
        }
    }
}

/// Raw numeric facts declared for a port, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFacts {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub default: Option<Number>,
    pub scale_points: Vec<RawScalePoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScalePoint {
    pub label: Option<String>,
    pub value: Option<Number>,
}

/// Which declared number a diagnostic is about.
#[derive(Debug, Clone, Copy)]
enum Field<'a> {
    Minimum,
    Maximum,
    Default,
    ScalePoint(&'a str),
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Minimum => f.write_str("minimum value"),
            Field::Maximum => f.write_str("maximum value"),
            Field::Default => f.write_str("default value"),
            Field::ScalePoint(label) => write!(f, "scalepoint '{}' value", label),
        }
    }
}

/// Per-port facts the normalizer needs, resolved once.
struct PortContext<'a> {
    name: &'a str,
    domain: Domain,
    is_cv: bool,
    is_input: bool,
    sample_rate: bool,
    latency: bool,
}

impl PortContext<'_> {
    fn coerce(&self, field: Field<'_>, value: Number, diagnostics: &mut Diagnostics) -> Number {
        let (value, issue) = coerce(value, self.domain);
        match issue {
            None => {}
            Some(CoercionIssue::RealWithoutFraction) => diagnostics.warning(format!(
                "port '{}' has integer property but {} is float",
                self.name, field
            )),
            Some(CoercionIssue::FractionDiscarded) => diagnostics.error(format!(
                "port '{}' has integer property but {} has non-zero decimals",
                self.name, field
            )),
            Some(CoercionIssue::IntegerOverflow) => diagnostics.error(format!(
                "port '{}' has integer property but {} is out of integer range",
                self.name, field
            )),
            Some(CoercionIssue::WrittenAsInteger) => diagnostics.warning(format!(
                "port '{}' {} is an integer",
                self.name, field
            )),
        }
        value
    }
}

/// Normalizes range, scale points and the `enumeration` flag of a control
/// or CV port in place. Ports of other classes are left untouched.
pub fn normalize_port(port: &mut PortDescriptor, facts: RangeFacts, diagnostics: &mut Diagnostics) {
    let is_cv = port.has_class("CV");
    if !is_cv && !port.has_class("Control") {
        return;
    }

    let latency_uri = ns::term(ns::LV2, "latency");
    let ctx = PortContext {
        name: &port.name,
        domain: Domain::of(port),
        is_cv,
        is_input: port.is_input(),
        sample_rate: port.has_property("sampleRate"),
        latency: port.designation.as_deref() == Some(latency_uri.as_str()),
    };

    if ctx.domain == Domain::Integer && ctx.is_cv {
        diagnostics.error(format!("port '{}' has integer property and CV type", ctx.name));
    }

    let range = normalize_range(&ctx, &facts, diagnostics);
    let scale_points = normalize_scale_points(&ctx, &range, facts.scale_points, diagnostics);

    if port.has_property("enumeration") && scale_points.len() <= 1 {
        diagnostics.error(format!(
            "port '{}' wants to use enumeration but doesn't have enough values",
            port.name
        ));
        port.properties.remove("enumeration");
    }

    port.range = Some(range);
    port.scale_points = scale_points;
}

fn normalize_range(ctx: &PortContext<'_>, facts: &RangeFacts, diagnostics: &mut Diagnostics) -> RangeSpec {
    let (Some(minimum), Some(maximum)) = (facts.minimum, facts.maximum) else {
        if !ctx.is_cv && !ctx.latency {
            diagnostics.error(format!("port '{}' is missing value ranges", ctx.name));
        }
        return synthesized_range(ctx);
    };

    let mut minimum = ctx.coerce(Field::Minimum, minimum, diagnostics);
    let mut maximum = ctx.coerce(Field::Maximum, maximum, diagnostics);

    if minimum.partial_cmp(&maximum) != Some(Ordering::Less) {
        (minimum, maximum) = widen(minimum);
        diagnostics.error(format!(
            "port '{}' minimum value is equal or higher than its maximum",
            ctx.name
        ));
    }

    let default = match facts.default {
        Some(default) => {
            let default = ctx.coerce(Field::Default, default, diagnostics);
            let (low, high) = if ctx.sample_rate {
                (scale_by_sample_rate(minimum), scale_by_sample_rate(maximum))
            } else {
                (minimum, maximum)
            };
            if low <= default && default <= high {
                default
            } else {
                diagnostics.error(format!("port '{}' default value is out of bounds", ctx.name));
                minimum
            }
        }
        None => {
            if ctx.is_input {
                diagnostics.error(format!("port '{}' is missing default value", ctx.name));
            }
            minimum
        }
    };

    RangeSpec {
        minimum,
        maximum,
        default,
    }
}

fn synthesized_range(ctx: &PortContext<'_>) -> RangeSpec {
    match ctx.domain {
        Domain::Integer => RangeSpec {
            minimum: Number::Integer(0),
            maximum: Number::Integer(1),
            default: Number::Integer(0),
        },
        Domain::Real => RangeSpec {
            minimum: Number::Real(if ctx.is_cv { -1.0 } else { 0.0 }),
            maximum: Number::Real(1.0),
            default: Number::Real(0.0),
        },
    }
}

/// Returns a `(minimum, maximum)` pair with `maximum` one step above
/// `minimum`: 1 for integers, 0.1 for reals.
fn widen(minimum: Number) -> (Number, Number) {
    match minimum {
        Number::Integer(min) => match min.checked_add(1) {
            Some(max) => (Number::Integer(min), Number::Integer(max)),
            None => (Number::Integer(min - 1), Number::Integer(min)),
        },
        Number::Real(min) => {
            let max = min + 0.1;
            if max > min || !min.is_finite() {
                (Number::Real(min), Number::Real(max))
            } else {
                // 0.1 is below the precision of large magnitudes.
                let bits = min.to_bits();
                let next = if min > 0.0 { bits + 1 } else { bits - 1 };
                (Number::Real(min), Number::Real(f64::from_bits(next)))
            }
        }
    }
}

fn scale_by_sample_rate(value: Number) -> Number {
    match value {
        Number::Integer(int) => Number::Integer(int.saturating_mul(REFERENCE_SAMPLE_RATE)),
        Number::Real(real) => Number::Real(real * REFERENCE_SAMPLE_RATE as f64),
    }
}

fn normalize_scale_points(
    ctx: &PortContext<'_>,
    range: &RangeSpec,
    points: Vec<RawScalePoint>,
    diagnostics: &mut Diagnostics,
) -> Vec<ScalePoint> {
    let mut accepted: Vec<(Number, String)> = Vec::new();

    for point in points {
        let Some(label) = point.label.filter(|label| !label.is_empty()) else {
            diagnostics.error(format!("port '{}' has a scalepoint without label", ctx.name));
            continue;
        };
        let Some(value) = point.value else {
            diagnostics.error(format!(
                "port '{}' scalepoint '{}' is missing its value",
                ctx.name, label
            ));
            continue;
        };

        let value = ctx.coerce(Field::ScalePoint(&label), value, diagnostics);
        if range.minimum <= value && value <= range.maximum {
            accepted.push((value, label));
        } else {
            diagnostics.error(format!(
                "port '{}' scalepoint '{}' has an out-of-bounds value: {} < {} < {}",
                ctx.name, label, range.minimum, value, range.maximum
            ));
        }
    }

    // Stable sort keeps declaration order among equal values, so the last
    // label declared for a value wins below.
    accepted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut points: Vec<ScalePoint> = Vec::with_capacity(accepted.len());
    for (value, label) in accepted {
        match points.last_mut() {
            Some(last) if last.value == value => last.label = label,
            _ => points.push(ScalePoint { value, label }),
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::*;
    use crate::plugin::Direction;

    fn control_port(properties: &[&str]) -> PortDescriptor {
        PortDescriptor {
            index: 0,
            name: "Gain".into(),
            symbol: "gain".into(),
            short_name: "Gain".into(),
            comment: None,
            designation: None,
            direction: Some(Direction::Input),
            classes: BTreeSet::from(["Control".to_string()]),
            properties: properties.iter().map(|p| p.to_string()).collect(),
            range_steps: None,
            range: None,
            units: None,
            scale_points: Vec::new(),
        }
    }

    fn facts(min: Option<Number>, max: Option<Number>, default: Option<Number>) -> RangeFacts {
        RangeFacts {
            minimum: min,
            maximum: max,
            default,
            scale_points: Vec::new(),
        }
    }

    fn point(label: &str, value: Number) -> RawScalePoint {
        RawScalePoint {
            label: Some(label.into()),
            value: Some(value),
        }
    }

    fn run(port: &mut PortDescriptor, facts: RangeFacts) -> crate::diagnostics::DiagnosticReport {
        let mut diagnostics = Diagnostics::new();
        normalize_port(port, facts, &mut diagnostics);
        diagnostics.finish()
    }

    #[rstest]
    #[case::int_exact(Number::Integer(3), Domain::Integer, Number::Integer(3), None)]
    #[case::real_exact(Number::Real(0.5), Domain::Real, Number::Real(0.5), None)]
    #[case::real_zero_fraction(
        Number::Real(4.0),
        Domain::Integer,
        Number::Integer(4),
        Some(CoercionIssue::RealWithoutFraction)
    )]
    #[case::real_with_fraction(
        Number::Real(-2.7),
        Domain::Integer,
        Number::Integer(-2),
        Some(CoercionIssue::FractionDiscarded)
    )]
    #[case::real_above_integer_range(
        Number::Real(1e30),
        Domain::Integer,
        Number::Integer(i64::MAX),
        Some(CoercionIssue::IntegerOverflow)
    )]
    #[case::real_below_integer_range(
        Number::Real(-1e30),
        Domain::Integer,
        Number::Integer(i64::MIN),
        Some(CoercionIssue::IntegerOverflow)
    )]
    #[case::int_in_real_domain(
        Number::Integer(2),
        Domain::Real,
        Number::Real(2.0),
        Some(CoercionIssue::WrittenAsInteger)
    )]
    fn coerce_reports_representation_mismatch(
        #[case] value: Number,
        #[case] domain: Domain,
        #[case] expected: Number,
        #[case] issue: Option<CoercionIssue>,
    ) {
        assert_eq!(coerce(value, domain), (expected, issue));
    }

    #[test]
    fn inverted_integer_range_is_widened_and_default_clamped() {
        let mut port = control_port(&["integer"]);
        let report = run(
            &mut port,
            facts(
                Some(Number::Integer(10)),
                Some(Number::Integer(5)),
                Some(Number::Integer(7)),
            ),
        );

        let range = port.range.expect("range");
        assert_eq!(range.minimum, Number::Integer(10));
        assert_eq!(range.maximum, Number::Integer(11));
        assert_eq!(range.default, Number::Integer(10));
        assert!(report
            .errors
            .contains(&"port 'Gain' minimum value is equal or higher than its maximum".to_string()));
        assert!(report
            .errors
            .contains(&"port 'Gain' default value is out of bounds".to_string()));
    }

    #[test]
    fn equal_real_bounds_get_a_tenth_apart() {
        let mut port = control_port(&[]);
        run(
            &mut port,
            facts(Some(Number::Real(1.0)), Some(Number::Real(1.0)), Some(Number::Real(1.0))),
        );
        let range = port.range.expect("range");
        assert_eq!(range.minimum, Number::Real(1.0));
        assert_eq!(range.maximum, Number::Real(1.1));
        assert_eq!(range.default, Number::Real(1.0));
    }

    #[test]
    fn missing_ranges_on_real_control_port() {
        let mut port = control_port(&[]);
        let report = run(&mut port, RangeFacts::default());

        assert_eq!(
            port.range,
            Some(RangeSpec {
                minimum: Number::Real(0.0),
                maximum: Number::Real(1.0),
                default: Number::Real(0.0),
            })
        );
        assert_eq!(report.errors, vec!["port 'Gain' is missing value ranges"]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn cv_port_without_ranges_is_exempt() {
        let mut port = control_port(&[]);
        port.classes = BTreeSet::from(["CV".to_string()]);
        let report = run(&mut port, RangeFacts::default());

        assert_eq!(port.range.expect("range").minimum, Number::Real(-1.0));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn latency_designation_is_exempt_from_ranges() {
        let mut port = control_port(&["integer"]);
        port.direction = Some(Direction::Output);
        port.designation = Some(ns::term(ns::LV2, "latency"));
        let report = run(&mut port, RangeFacts::default());

        assert_eq!(port.range.expect("range").maximum, Number::Integer(1));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn integer_cv_port_is_an_error() {
        let mut port = control_port(&["integer"]);
        port.classes = BTreeSet::from(["CV".to_string()]);
        let report = run(&mut port, RangeFacts::default());
        assert!(report
            .errors
            .contains(&"port 'Gain' has integer property and CV type".to_string()));
    }

    #[test]
    fn missing_default_on_input_is_an_error() {
        let mut port = control_port(&[]);
        let report = run(&mut port, facts(Some(Number::Real(0.0)), Some(Number::Real(2.0)), None));
        assert_eq!(port.range.expect("range").default, Number::Real(0.0));
        assert_eq!(report.errors, vec!["port 'Gain' is missing default value"]);
    }

    #[test]
    fn missing_default_on_output_is_silent() {
        let mut port = control_port(&[]);
        port.direction = Some(Direction::Output);
        let report = run(&mut port, facts(Some(Number::Real(0.0)), Some(Number::Real(2.0)), None));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn sample_rate_default_is_checked_against_scaled_bounds() {
        let mut port = control_port(&["sampleRate"]);
        let report = run(
            &mut port,
            facts(Some(Number::Real(0.0)), Some(Number::Real(0.5)), Some(Number::Real(440.0))),
        );
        assert_eq!(port.range.expect("range").default, Number::Real(440.0));
        assert!(report.errors.is_empty());
    }

    #[rstest]
    #[case::above_scaled_maximum(30_000.0)]
    #[case::below_scaled_minimum(100.0)]
    fn sample_rate_default_outside_scaled_bounds_is_clamped(#[case] default: f64) {
        let mut port = control_port(&["sampleRate"]);
        let report = run(
            &mut port,
            facts(Some(Number::Real(0.01)), Some(Number::Real(0.5)), Some(Number::Real(default))),
        );
        assert_eq!(port.range.expect("range").default, Number::Real(0.01));
        assert_eq!(report.errors, vec!["port 'Gain' default value is out of bounds"]);
    }

    #[test]
    fn integer_bound_beyond_i64_is_an_error() {
        let mut port = control_port(&["integer"]);
        let report = run(
            &mut port,
            facts(Some(Number::Integer(0)), Some(Number::Real(1e30)), Some(Number::Integer(0))),
        );
        assert_eq!(port.range.expect("range").maximum, Number::Integer(i64::MAX));
        assert_eq!(
            report.errors,
            vec!["port 'Gain' has integer property but maximum value is out of integer range"]
        );
    }

    #[test]
    fn integer_values_in_real_domain_only_warn() {
        let mut port = control_port(&[]);
        let report = run(
            &mut port,
            facts(
                Some(Number::Integer(0)),
                Some(Number::Integer(10)),
                Some(Number::Integer(5)),
            ),
        );
        let range = port.range.expect("range");
        assert_eq!(range.maximum, Number::Real(10.0));
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![
                "port 'Gain' default value is an integer",
                "port 'Gain' maximum value is an integer",
                "port 'Gain' minimum value is an integer",
            ]
        );
    }

    #[test]
    fn fractional_values_in_integer_domain_are_errors() {
        let mut port = control_port(&["integer"]);
        let report = run(
            &mut port,
            facts(
                Some(Number::Real(0.0)),
                Some(Number::Real(8.5)),
                Some(Number::Integer(1)),
            ),
        );
        assert_eq!(port.range.expect("range").maximum, Number::Integer(8));
        assert_eq!(
            report.errors,
            vec!["port 'Gain' has integer property but maximum value has non-zero decimals"]
        );
        assert_eq!(
            report.warnings,
            vec!["port 'Gain' has integer property but minimum value is float"]
        );
    }

    #[test]
    fn scale_points_are_sorted_deduplicated_and_bounded() {
        let mut port = control_port(&["integer", "enumeration"]);
        let mut raw = facts(
            Some(Number::Integer(0)),
            Some(Number::Integer(3)),
            Some(Number::Integer(0)),
        );
        raw.scale_points = vec![
            point("Three", Number::Integer(3)),
            point("One", Number::Integer(1)),
            point("Uno", Number::Integer(1)),
            point("Nine", Number::Integer(9)),
            RawScalePoint {
                label: None,
                value: Some(Number::Integer(2)),
            },
            RawScalePoint {
                label: Some("Two".into()),
                value: None,
            },
        ];
        let report = run(&mut port, raw);

        assert_eq!(
            port.scale_points,
            vec![
                ScalePoint {
                    value: Number::Integer(1),
                    label: "Uno".into()
                },
                ScalePoint {
                    value: Number::Integer(3),
                    label: "Three".into()
                },
            ]
        );
        assert!(port.has_property("enumeration"));
        assert_eq!(
            report.errors,
            vec![
                "port 'Gain' has a scalepoint without label",
                "port 'Gain' scalepoint 'Nine' has an out-of-bounds value: 0 < 9 < 3",
                "port 'Gain' scalepoint 'Two' is missing its value",
            ]
        );
    }

    #[test]
    fn enumeration_without_enough_points_is_dropped() {
        let mut port = control_port(&["enumeration"]);
        let mut raw = facts(Some(Number::Real(0.0)), Some(Number::Real(1.0)), Some(Number::Real(0.0)));
        raw.scale_points = vec![point("Only", Number::Real(0.5))];
        let report = run(&mut port, raw);

        assert!(!port.has_property("enumeration"));
        assert_eq!(
            report.errors,
            vec!["port 'Gain' wants to use enumeration but doesn't have enough values"]
        );
    }

    #[test]
    fn audio_ports_are_not_touched() {
        let mut port = control_port(&[]);
        port.classes = BTreeSet::from(["Audio".to_string()]);
        let report = run(&mut port, RangeFacts::default());
        assert!(port.range.is_none());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = facts(
            Some(Number::Integer(10)),
            Some(Number::Integer(5)),
            Some(Number::Integer(7)),
        );
        let mut first = control_port(&["integer"]);
        let mut second = control_port(&["integer"]);
        let first_report = run(&mut first, raw.clone());
        let second_report = run(&mut second, raw);
        assert_eq!(first, second);
        assert_eq!(first_report, second_report);
    }
}
