//! Serialization and encodings.
//!
//! Each encoding has a corresponding sub-module that exposes conversion traits
//! for reading and writing buffers. The following table summarizes the
//! encodings supported by Terrane:
//!
//! | Module | Encoding | Read | Write |
//! |--------|----------|------|-------|
//! | `obj`  | [OBJ]    | Yes  | Yes   |
//!
//! Only a subset of each format is supported. Prefer the conversion traits,
//! such as `FromObj` and `ToObj`, over the lower-level decoding functions.
//!
//! [OBJ]: https://en.wikipedia.org/wiki/Wavefront_.obj_file

pub mod obj;

/// Inclusion of vertex normals in encoded output.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NormalEncoding {
    #[default]
    Include,
    Omit,
}
