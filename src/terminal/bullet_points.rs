use console::{pad_str, Alignment};
use std::fmt::Display;

const INDENT_SIZE: usize = 2;

pub struct BulletPointPrinter<W: LineWriter + Clone = StdoutLineWriter> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl Display) {
        let indent = " ".repeat(self.nesting * INDENT_SIZE);
        self.writer.write_line(&format!("{}• {}", indent, message));
    }

    /// Prints `(none)` instead of an empty list.
    pub fn print_items<T: Display>(&self, items: impl IntoIterator<Item = T>) -> usize {
        let mut count = 0;
        for item in items {
            self.print_item(item);
            count += 1;
        }
        if count == 0 {
            self.print_item(console::style("(none)").italic());
        }
        count
    }

    /// Prints `title` and below it the items, one level deeper. Returns the number of items.
    pub fn print_section<T: Display>(
        &self,
        title: impl Display,
        items: impl IntoIterator<Item = T>,
    ) -> usize {
        self.print_item(title);
        self.indent().print_items(items)
    }

    /// Prints `label` padded to `width` columns so that the values of consecutive calls line up.
    pub fn print_labeled(&self, label: &str, width: usize, value: impl Display) {
        self.print_item(format!(
            "{} {}",
            pad_str(label, width, Alignment::Left, None),
            value
        ));
    }

    pub fn indent(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + 1,
        }
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new_stdout() -> Self {
        Self::new(StdoutLineWriter)
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;
impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}
