use std::io::{self, Write};

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    container::Container,
    coordinator::Coordinator,
    error::{Error, Result},
    geom::Rect,
    id::WidgetId,
};

/// Convert a buffer write failure.
fn io_err(e: io::Error) -> Error {
    Error::Internal(format!("dump: {e}"))
}

/// Walks the container tree below `root` and returns a colored textual view
/// of every container, its children and their computed rects. This is a
/// debug function.
pub fn dump(coord: &Coordinator, root: WidgetId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_widget(&mut buffer, coord, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`], without color escapes.
pub fn dump_plain(coord: &Coordinator, root: WidgetId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_widget(&mut buffer, coord, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Dump every root container.
pub fn dump_all(coord: &Coordinator) -> Result<String> {
    let mut out = String::new();
    for root in coord.roots() {
        out.push_str(&dump(coord, root)?);
    }
    Ok(out)
}

/// Format a rect.
fn rect(r: Rect) -> String {
    format!("x: {}, y: {}, w: {}, h: {}", r.tl.x, r.tl.y, r.w, r.h)
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ").map_err(io_err)?;
    buffer
        .set_color(ColorSpec::new().set_fg(Some(Color::Green)))
        .map_err(io_err)?;
    write!(buffer, "{label}").map_err(io_err)?;
    buffer.reset().map_err(io_err)?;
    writeln!(buffer, " {value}").map_err(io_err)
}

/// Emit one widget and, for containers, its children.
fn dump_widget(buffer: &mut Buffer, coord: &Coordinator, id: WidgetId, level: usize) -> Result<()> {
    let connector = coord.connector(id).ok_or(Error::UnknownWidget(id))?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}").map_err(io_err)?;
    buffer
        .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))
        .map_err(io_err)?;
    write!(buffer, "{connector}").map_err(io_err)?;
    buffer.reset().map_err(io_err)?;

    if let Some(container) = coord.container(id) {
        buffer
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))
            .map_err(io_err)?;
        write!(buffer, " {:?}", container.kind()).map_err(io_err)?;
        buffer.reset().map_err(io_err)?;
    }
    writeln!(buffer).map_err(io_err)?;

    if let Some(geometry) = coord.slot_geometry(id) {
        write_field(buffer, &indent, "cell:", &rect(geometry.cell))?;
        write_field(buffer, &indent, "widget:", &rect(geometry.widget))?;
        if let Some(c) = geometry.caption {
            write_field(buffer, &indent, "caption:", &rect(c))?;
        }
    }
    let markers = coord
        .parent(id)
        .and_then(|p| match coord.container(p) {
            Some(Container::Ordered(parent)) => parent.slot(id),
            Some(Container::Grid(parent)) => parent.slot(id),
            _ => None,
        })
        .map(|slot| slot.markers().join(" "))
        .unwrap_or_default();
    if !markers.is_empty() {
        write_field(buffer, &indent, "markers:", &markers)?;
    }
    let spacing = match coord.container(id) {
        Some(Container::Ordered(o)) => Some((o.margins(), o.spacing())),
        Some(Container::Grid(g)) => Some((g.margins(), g.spacing())),
        _ => None,
    };
    if let Some((margins, spacing)) = spacing {
        write_field(
            buffer,
            &indent,
            "margins:",
            &format!("{:#06b}, spacing: {spacing}", margins.bits()),
        )?;
    }
    if let Some(layout) = coord.layout_of(id) {
        write_field(
            buffer,
            &indent,
            "size:",
            &format!("{} × {}", layout.size.w, layout.size.h),
        )?;
    }

    for child in coord.children(id) {
        dump_widget(buffer, coord, child, level + 1)?;
    }
    Ok(())
}
