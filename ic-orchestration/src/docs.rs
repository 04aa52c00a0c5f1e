//! Tabela de documentação dos ICs
//!
//! Renders the registered chips as a reStructuredText simple table, one row
//! per chip in registration order, with the model id linked via `:doc:`.

use serde::Serialize;

use ic_core::ChipDefinition;

/// Placeholder replaced by [`substitute_ic_table`].
pub const IC_TABLE_PLACEHOLDER: &str = "%IC_TABLE%";

const HEADERS: [&str; 6] = ["IC ID", "Shorthand", "Name", "Description", "Family", "Self Triggering"];

/// Linha da tabela
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IcTableRow {
    pub id: String,
    pub shorthand: String,
    pub name: String,
    pub description: String,
    pub family: String,
    pub self_triggering: bool,
}

impl IcTableRow {
    pub fn from_definition(definition: &ChipDefinition) -> Self {
        Self {
            id: definition.model_id().to_string(),
            shorthand: definition.shorthand_id().to_string(),
            name: definition.name().to_string(),
            description: definition.description().to_string(),
            family: definition.default_family().to_string(),
            self_triggering: definition.is_self_triggering(),
        }
    }

    fn cells(&self) -> [String; 6] {
        [
            format!(":doc:`{}`", self.id),
            self.shorthand.clone(),
            self.name.clone(),
            self.description.clone(),
            self.family.clone(),
            if self.self_triggering { "Yes" } else { "No" }.to_string(),
        ]
    }
}

fn pad_to_length(text: &str, length: usize) -> String {
    format!("{text:<length$}")
}

/// Renders the full IC index page: hidden toctree, heading and table.
pub fn render_ic_table(rows: &[IcTableRow]) -> String {
    let cells: Vec<[String; 6]> = rows.iter().map(IcTableRow::cells).collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|width| "=".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::new();
    out.push_str(".. toctree::\n");
    out.push_str("    :hidden:\n");
    out.push_str("    :glob:\n");
    out.push_str("    :titlesonly:\n\n");
    out.push_str("    *\n\n");
    out.push_str("ICs\n");
    out.push_str("===\n\n");

    out.push_str(&border);
    out.push('\n');
    for (header, width) in HEADERS.iter().zip(widths) {
        out.push_str(&pad_to_length(header, width + 1));
    }
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for row in &cells {
        for (cell, width) in row.iter().zip(widths) {
            out.push_str(&pad_to_length(cell, width + 1));
        }
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

/// Replaces every `%IC_TABLE%` in `template` with the rendered table.
pub fn substitute_ic_table(template: &str, rows: &[IcTableRow]) -> String {
    if !template.contains(IC_TABLE_PLACEHOLDER) {
        return template.to_string();
    }
    template.replace(IC_TABLE_PLACEHOLDER, &render_ic_table(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ChipRegistry;

    #[test]
    fn test_rows_follow_registration_order() {
        let rows = ChipRegistry::with_builtins().rows();
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["MC1000", "MC1001", "MC1025", "MC1421", "MC3002", "MC3003", "MC3020"]);
        assert!(rows[3].self_triggering);
    }

    #[test]
    fn test_table_layout() {
        let rows = vec![IcTableRow {
            id: "MC1421".into(),
            shorthand: "CLOCK".into(),
            name: "Clock".into(),
            description: "Ticks".into(),
            family: "SISO".into(),
            self_triggering: true,
        }];
        let table = render_ic_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], ".. toctree::");
        let heading = lines.iter().position(|line| *line == "ICs").unwrap();
        assert_eq!(lines[heading + 1], "===");

        let border = lines[heading + 3];
        assert_eq!(border, "============= ========= ===== =========== ====== ===============");
        assert!(lines[heading + 4].starts_with("IC ID         Shorthand Name "));
        assert!(lines[heading + 6].starts_with(":doc:`MC1421` CLOCK     Clock "));
        assert!(lines[heading + 6].contains(" Yes"));
        assert_eq!(lines.last().copied(), Some(border));
    }

    #[test]
    fn test_substitution() {
        let rows = ChipRegistry::with_builtins().rows();
        let page = substitute_ic_table("Intro\n\n%IC_TABLE%\nOutro\n", &rows);
        assert!(page.starts_with("Intro\n\n.. toctree::"));
        assert!(page.contains(":doc:`MC3020`"));
        assert!(page.ends_with("Outro\n"));
        assert_eq!(substitute_ic_table("no table", &rows), "no table");
    }

    #[test]
    fn test_rows_as_json() {
        let rows = ChipRegistry::with_builtins().rows();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[3]["shorthand"], "CLOCK");
        assert_eq!(json[3]["self_triggering"], true);
    }
}
