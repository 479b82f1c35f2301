//! The `KEY = VALUE` config document format consumed by doxygen-style
//! documentation generators: `#` comments, backslash line continuations,
//! plain assignment with `=` and additive assignment with `+=`.

mod map;
pub use map::ConfigMap;

mod parse;
pub use parse::parse;
