/*
 * This file is part of Fanmode.
 *
 * Copyright (C) 2025 Fanmode contributors
 *
 * Fanmode is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanmode is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanmode. If not, see <https://www.gnu.org/licenses/>.
 */

//! Plain-text tables.
//!
//! Tables are drawn with ratatui's `Table` widget into an off-screen buffer
//! sized to fit the content, then flushed line by line as ordinary text so the
//! output can be piped.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Row, Table, Widget};

use crate::error::Result;
use crate::fan::PwmWrite;
use crate::registry::FanRegistry;

const MAX_COLUMN_WIDTH: usize = 512;

pub struct TextTable {
    title: Option<String>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

impl TextTable {
    pub fn new(header: &[&str]) -> Self {
        Self {
            title: None,
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(format!(" {} ", title));
        self
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.header.len(), String::new());
        self.rows.push(cells);
    }

    fn column_widths(&self) -> Vec<u16> {
        self.header
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let cells = self.rows.iter().map(|r| text_width(&r[i]));
                cells.fold(text_width(h), usize::max).min(MAX_COLUMN_WIDTH) as u16
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let gaps = widths.len().saturating_sub(1) as u16;
        let content: u16 = widths.iter().sum::<u16>() + gaps;
        let title_width = self.title.as_deref().map(text_width).unwrap_or(0) as u16;
        let width = content.max(title_width) + 2;
        // borders, header and its spacer line
        let height = self.rows.len().min(u16::MAX as usize - 4) as u16 + 4;

        let header = Row::new(self.header.clone())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);
        let rows = self.rows.iter().map(|r| Row::new(r.clone()));
        let mut block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded);
        if let Some(title) = &self.title {
            block = block.title(title.clone());
        }
        let table = Table::new(rows, widths.iter().map(|w| Constraint::Length(*w)))
            .header(header)
            .block(block);

        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);

        let mut out = String::new();
        for line in buf.content.chunks(width as usize) {
            let text: String = line.iter().map(|cell| cell.symbol()).collect();
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Current mode and duty cycle of every fan, in catalog order
pub fn fans_table(registry: &FanRegistry) -> Result<String> {
    let mut table = TextTable::new(&["Name", "Mode", "PWM"]).title("FANS");
    for fan in registry.fans() {
        table.row([fan.name().to_string(), fan.get_mode()?.to_string(), fan.get_pwm()?.to_string()]);
    }
    Ok(table.render())
}

pub fn aliases_table(registry: &FanRegistry) -> String {
    let mut table = TextTable::new(&["Name", "Fans"]).title("ALIASES");
    for alias in registry.aliases() {
        table.row([alias.name.clone(), alias.members().collect::<Vec<_>>().join(", ")]);
    }
    table.render()
}

pub fn modes_table(registry: &FanRegistry) -> String {
    let mut table = TextTable::new(&["Name", "PWM"]).title("MODES");
    for mode in registry.modes() {
        table.row([mode.name.clone(), mode.pwm.to_string()]);
    }
    table.row(["auto", "-"]);
    table.row(["manual", "-"]);
    table.render()
}

pub fn commands_table() -> String {
    let mut table = TextTable::new(&["Command", "Syntax", "Description"]).title("COMMANDS");
    table.row(["set", "set <fans> <mode/pwm> <value>", "Set fan mode/pwm"]);
    table.row(["info | show", "info/show", "Show fans, aliases and modes"]);
    table.row(["default", "default", "Set auto mode on all fans"]);
    table.row(["fans", "fans", "Show fans"]);
    table.row(["config", "config", "Print the active configuration as JSON"]);
    table.row(["help", "help", "Show this message"]);
    table.render()
}

pub fn examples_table() -> String {
    let mut table = TextTable::new(&["Examples"]);
    table.row(["fanmode set full-case mode high"]);
    table.row(["fanmode set cpu+case pwm 100"]);
    table.row(["fanmode set cpu+case mode auto"]);
    table.row(["fanmode set gpu mode manual"]);
    table.render()
}

/// Line printed for a PWM write the driver did not keep exactly
pub fn pwm_warning(fan: &str, outcome: &PwmWrite) -> Option<String> {
    match outcome {
        PwmWrite::Exact(_) => None,
        PwmWrite::Mismatch { requested, actual } => Some(format!(
            "[W] PWM set on {} inaccurately ({} != {})",
            fan, requested, actual
        )),
    }
}
