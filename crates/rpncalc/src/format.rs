//! Rendering cells for display.

use rpncalc_script::Value;

/// Turns a cell into display text.
pub trait Formatter {
    fn format(&self, value: &Value) -> String;
}

/// Renders cells the way the evaluator prints them.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Render a stack, top first, as `label: text` lines with the top last.
pub fn render_stack(cells: &[Value], formatter: &dyn Formatter) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .rev()
        .map(|(i, cell)| format!("{}: {}", level_label(i), formatter.format(cell)))
        .collect()
}

/// `X`, `Y`, `Z`, `T` for the first four levels, then the level number.
pub fn level_label(position: usize) -> String {
    match position {
        0 => "X".to_string(),
        1 => "Y".to_string(),
        2 => "Z".to_string(),
        3 => "T".to_string(),
        n => (n + 1).to_string(),
    }
}
