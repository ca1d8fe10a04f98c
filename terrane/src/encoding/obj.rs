//! [OBJ](https://en.wikipedia.org/wiki/Wavefront_.obj_file) encoding.
//!
//! This module provides support for a subset of the OBJ format via the
//! `FromObj` and `ToObj` traits.
//!
//! OBJ is line-oriented. Decoding recognizes two statements and ignores all
//! others:
//!
//! | Statement          | Meaning                                          |
//! |--------------------|--------------------------------------------------|
//! | `v x y z`          | vertex position; further tokens are ignored      |
//! | `f a b c ...`      | polygon; fan-triangulated about its first vertex |
//!
//! Text following `#` is a comment. Face references may take the forms `i`,
//! `i/t`, `i//n`, and `i/t/n`, of which only the position index `i` is used.
//! Indices are 1-based and negative indices are relative to the most recently
//! read vertex, so `-1` refers to the last vertex read so far.
//!
//! Malformed statements are rejected with the 1-based number of the offending
//! line rather than producing `NaN`s.
//!
//! # Examples
//!
//! Reading a quad into a `MeshBuffer`:
//!
//! ```rust
//! use terrane::buffer::MeshBuffer;
//! use terrane::encoding::obj::FromObj;
//!
//! let obj = "\
//! # unit square
//! v 0 0 0
//! v 1 0 0
//! v 1 1 0
//! v 0 1 0
//! f 1 2 3 4
//! ";
//! let buffer = MeshBuffer::from_obj(obj.as_bytes()).unwrap();
//!
//! assert_eq!(4, buffer.vertex_count());
//! assert_eq!(2, buffer.triangle_count());
//! ```

use smallvec::SmallVec;
use std::io::{self, Read, Write};
use std::str::FromStr;
use thiserror::Error;

use crate::buffer::{BufferBuilder, BufferError, MeshBuffer, TriangleSoup};
use crate::encoding::NormalEncoding;
use crate::geometry::{Vector3, E3};
use crate::primitive::Trigon;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to parse line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ObjError {
    fn parse(line: usize, reason: impl Into<String>) -> Self {
        ObjError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

pub trait FromObj: Sized {
    fn from_obj<R>(read: R) -> Result<Self, ObjError>
    where
        R: Read;
}

impl FromObj for MeshBuffer {
    fn from_obj<R>(mut read: R) -> Result<Self, ObjError>
    where
        R: Read,
    {
        let mut text = String::new();
        read.read_to_string(&mut text)?;
        decode(&text)?.build().map_err(From::from)
    }
}

pub trait ToObj {
    /// Writes OBJ statements and gets the number of bytes written.
    fn to_obj<W>(&self, normals: NormalEncoding, write: W) -> Result<usize, ObjError>
    where
        W: Write;
}

impl ToObj for MeshBuffer {
    fn to_obj<W>(&self, normals: NormalEncoding, write: W) -> Result<usize, ObjError>
    where
        W: Write,
    {
        encode(
            self.as_position_slice(),
            self.as_normal_slice(),
            self.as_triangle_slice().iter().copied(),
            normals,
            write,
        )
    }
}

impl ToObj for TriangleSoup {
    fn to_obj<W>(&self, normals: NormalEncoding, write: W) -> Result<usize, ObjError>
    where
        W: Write,
    {
        let count = u32::try_from(self.vertex_count()).map_err(|_| BufferError::IndexOverflow)?;
        encode(
            self.as_position_slice(),
            self.as_normal_slice(),
            (0..count)
                .step_by(3)
                .map(|index| Trigon::new(index, index + 1, index + 2)),
            normals,
            write,
        )
    }
}

/// Decodes OBJ text into a [`BufferBuilder`].
///
/// Indices are resolved but not bounds-checked; a positive index beyond the
/// vertices of the text is reported when the builder is built.
///
/// # Errors
///
/// Returns an error if a `v` statement has fewer than three coordinates or a
/// coordinate is not a finite number, or if an `f` statement has fewer than three
/// references or a reference is not a valid index.
pub fn decode(text: &str) -> Result<BufferBuilder, ObjError> {
    let mut builder = BufferBuilder::new();
    for (n, content) in text.lines().enumerate() {
        let line = n + 1;
        let statement = text_before_comment(content);
        let mut tokens = statement.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let position = parse_position(line, tokens)?;
                builder.insert_vertex(position)?;
            }
            Some("f") => {
                let keys = tokens
                    .map(|token| parse_reference(line, token, builder.vertex_count()))
                    .collect::<Result<SmallVec<[u32; 4]>, _>>()?;
                if keys.len() < 3 {
                    return Err(ObjError::parse(
                        line,
                        format!("face has {} vertices; expected at least 3", keys.len()),
                    ));
                }
                builder.insert_polygon(&keys)?;
            }
            Some(keyword) => {
                log::trace!("ignoring `{}` statement on line {}", keyword, line);
            }
            None => {}
        }
    }
    log::debug!(
        "decoded OBJ: {} vertices, {} triangles",
        builder.vertex_count(),
        builder.triangle_count(),
    );
    Ok(builder)
}

fn text_before_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default()
}

fn parse_position<'a, I>(line: usize, tokens: I) -> Result<E3, ObjError>
where
    I: Iterator<Item = &'a str>,
{
    let coordinates = tokens
        .take(3)
        .map(|token| {
            f32::from_str(token)
                .ok()
                .filter(|coordinate| coordinate.is_finite())
                .ok_or_else(|| ObjError::parse(line, format!("invalid coordinate `{}`", token)))
        })
        .collect::<Result<SmallVec<[f32; 3]>, _>>()?;
    match coordinates.as_slice() {
        &[x, y, z] => Ok(E3::new(x, y, z)),
        coordinates => Err(ObjError::parse(
            line,
            format!("vertex has {} coordinates; expected 3", coordinates.len()),
        )),
    }
}

// Resolves the position index of a face reference against the number of
// vertices read so far.
fn parse_reference(line: usize, token: &str, count: usize) -> Result<u32, ObjError> {
    let invalid = |reason: &str| ObjError::parse(line, format!("{} `{}`", reason, token));
    let index = token
        .split('/')
        .next()
        .and_then(|index| i64::from_str(index).ok())
        .ok_or_else(|| invalid("invalid vertex reference"))?;
    let index = match index {
        0 => None,
        index if index > 0 => Some(index - 1),
        index => i64::try_from(count).ok().map(|count| count + index),
    };
    index
        .filter(|index| *index >= 0)
        .and_then(|index| u32::try_from(index).ok())
        .ok_or_else(|| invalid("vertex reference out of range"))
}

fn encode<W, I>(
    positions: &[E3],
    normals: &[Vector3<f32>],
    triangles: I,
    encoding: NormalEncoding,
    write: W,
) -> Result<usize, ObjError>
where
    W: Write,
    I: IntoIterator<Item = Trigon>,
{
    let mut write = CountingWrite::new(write);
    for position in positions {
        writeln!(write, "v {} {} {}", position.x, position.y, position.z)?;
    }
    if let NormalEncoding::Include = encoding {
        for normal in normals {
            writeln!(write, "vn {} {} {}", normal.x, normal.y, normal.z)?;
        }
    }
    for trigon in triangles {
        let [a, b, c] = trigon.into_array().map(|index| u64::from(index) + 1);
        match encoding {
            NormalEncoding::Include => {
                writeln!(write, "f {a}//{a} {b}//{b} {c}//{c}", a = a, b = b, c = c)?
            }
            NormalEncoding::Omit => writeln!(write, "f {} {} {}", a, b, c)?,
        }
    }
    write.flush()?;
    Ok(write.count)
}

struct CountingWrite<W> {
    inner: W,
    count: usize,
}

impl<W> CountingWrite<W> {
    fn new(inner: W) -> Self {
        CountingWrite { inner, count: 0 }
    }
}

impl<W> Write for CountingWrite<W>
where
    W: Write,
{
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buffer)?;
        self.count += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
