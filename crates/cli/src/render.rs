//! Plain-text outline of a navigation tree.

use std::fmt::Write;

use navtree_types::{NavChild, NavItem};

const INDENT: &str = "  ";

/// Renders `items` as an indented outline. Active entries are marked with
/// `*`; sub menus are listed only when the sidebar is pinned.
pub fn outline(items: &[NavItem], pinned: bool) -> String {
    let mut out = String::new();
    for item in items {
        write_item(&mut out, item, 0, pinned);
    }
    out
}

fn write_item(out: &mut String, item: &NavItem, depth: usize, pinned: bool) {
    let marker = if item.is_active { '*' } else { '-' };
    let hidden = if item.is_hidden { " (hidden)" } else { "" };
    let _ = writeln!(
        out,
        "{}{marker} {} [{}] {}{hidden}",
        INDENT.repeat(depth),
        item.title,
        item.id,
        item.url
    );

    if pinned {
        for tab in &item.sub_menus {
            let _ = writeln!(out, "{}> {} {}", INDENT.repeat(depth + 1), tab.title, tab.url);
        }
    }

    for child in &item.children {
        match child {
            NavChild::Item(child) => write_item(out, child, depth + 1, pinned),
            NavChild::LoadingPlaceholder => {
                let _ = writeln!(out, "{}…loading", INDENT.repeat(depth + 1));
            }
        }
    }
}
