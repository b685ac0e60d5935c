use crate::ConcatEngine;

/// Compilation options.
///
/// ```
/// use weft::Options;
///
/// let options = Options::new().file("greet.weft").line(1).trim(true);
/// let ast = weft::compile_with("Hello <%= name %>", options).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Options<E = ConcatEngine> {
    /// Display name used in error messages.
    pub file: String,
    /// Line number of the first source character.
    pub line: usize,
    /// Fold whitespace around tags that sit alone on their line.
    pub trim: bool,
    /// The rendering engine driving buffer accumulation.
    pub engine: E,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            file: "nofile".to_owned(),
            line: 1,
            trim: false,
            engine: ConcatEngine,
        }
    }
}

impl<E> Options<E> {
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Swap in another [`Engine`][crate::Engine] implementation.
    pub fn engine<F>(self, engine: F) -> Options<F> {
        Options {
            file: self.file,
            line: self.line,
            trim: self.trim,
            engine,
        }
    }
}
