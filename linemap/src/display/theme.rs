//! Listing color theme

use crossterm::style::Color;

pub const LINE_NUMBER: Color = Color::Yellow;
pub const ADDRESS: Color = Color::Red;
pub const FILE_HEADER: Color = Color::Green;
