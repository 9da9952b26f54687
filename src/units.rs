//! Measurement unit resolution for control ports.

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::UnitSpec;
use crate::repository::MetadataRepository;
use crate::tables::builtin_unit;

/// Resolves the unit declared on a control port.
///
/// Units from the LV2 units namespace are copied from the built-in table;
/// anything else is a custom unit whose label, render template and symbol
/// are looked up on the unit resource itself. A unit is only returned when
/// all three fields resolved; every missing piece is reported on its own.
pub fn resolve_unit<R>(
    repo: &R,
    port_node: &str,
    port_name: &str,
    diagnostics: &mut Diagnostics,
) -> Option<UnitSpec>
where
    R: MetadataRepository + ?Sized,
{
    let unit = repo.first_fact(port_node, &ns::term(ns::UNITS, "unit"))?;
    let unit = unit.lexical().trim().to_string();

    if let Some(suffix) = unit.strip_prefix(ns::UNITS) {
        return match builtin_unit(suffix) {
            Some(builtin) => Some(UnitSpec {
                label: builtin.label.to_string(),
                render: builtin.render.to_string(),
                symbol: builtin.symbol.to_string(),
            }),
            None => {
                diagnostics.error(format!(
                    "port '{}' has invalid lv2 unit '{}'",
                    port_name, suffix
                ));
                None
            }
        };
    }

    let mut custom_field = |predicate: String, field: &str| {
        let value = repo
            .first_string(&unit, &predicate)
            .filter(|value| !value.is_empty());
        if value.is_none() {
            diagnostics.error(format!(
                "port '{}' has custom unit with no {}",
                port_name, field
            ));
        }
        value
    };

    let label = custom_field(ns::term(ns::RDFS, "label"), "label");
    let render = custom_field(ns::term(ns::UNITS, "render"), "render");
    let symbol = custom_field(ns::term(ns::UNITS, "symbol"), "symbol");

    Some(UnitSpec {
        label: label?,
        render: render?,
        symbol: symbol?,
    })
}
