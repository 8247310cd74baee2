//! Saving and loading grids as NumPy `.npy` arrays.
//!
//! Saved files are format 1.0, dtype `|u1`, C order, shape `(n, n, n)`.
//! Loading accepts formats 1.0 to 3.0, either memory order and the common
//! boolean, integer and float dtypes, as long as every value is 0 or 1.
//!
//! Array axis 0 maps to the grid's z axis and axis 2 to x, so the flat
//! C-order payload is exactly `Grid::cells`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::automaton::grid::{cell_count, from_cells};
use crate::error::{LifeError, Result};
use crate::state::Grid;

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGN: usize = 64;
pub const NPY_EXTENSION: &str = "npy";

/// Element type of an NPY payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Bool,
    Int,
    Uint,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Dtype {
    kind: Kind,
    width: usize,
    big_endian: bool,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self> {
        let mut chars = descr.chars();
        let order = chars
            .next()
            .ok_or_else(|| LifeError::npy("empty dtype descriptor"))?;
        let big_endian = match order {
            '<' | '|' | '=' => false,
            '>' => true,
            other => return Err(LifeError::npy(format!("unknown byte order '{other}'"))),
        };
        let kind = match chars.next() {
            Some('b') => Kind::Bool,
            Some('i') => Kind::Int,
            Some('u') => Kind::Uint,
            Some('f') => Kind::Float,
            _ => return Err(LifeError::npy(format!("unsupported dtype '{descr}'"))),
        };
        let width: usize = chars
            .as_str()
            .parse()
            .map_err(|_| LifeError::npy(format!("bad dtype width in '{descr}'")))?;

        let supported = match kind {
            Kind::Bool => width == 1,
            Kind::Int | Kind::Uint => matches!(width, 1 | 2 | 4 | 8),
            Kind::Float => matches!(width, 4 | 8),
        };
        if !supported {
            return Err(LifeError::npy(format!("unsupported dtype '{descr}'")));
        }

        Ok(Dtype {
            kind,
            width,
            big_endian,
        })
    }

    /// Decode one element as f64, which holds every supported value exactly enough to test 0/1.
    fn decode(&self, bytes: &[u8]) -> f64 {
        let mut buf = [0u8; 8];
        if self.big_endian {
            buf[8 - self.width..].copy_from_slice(bytes);
            buf.reverse();
        } else {
            buf[..self.width].copy_from_slice(bytes);
        }
        let raw = u64::from_le_bytes(buf);

        match self.kind {
            Kind::Bool | Kind::Uint => raw as f64,
            Kind::Int => {
                let shift = 64 - 8 * self.width as u32;
                (((raw << shift) as i64) >> shift) as f64
            }
            Kind::Float if self.width == 4 => f64::from(f32::from_bits(raw as u32)),
            Kind::Float => f64::from_bits(raw),
        }
    }
}

/// Parsed header dictionary.
#[derive(Debug, PartialEq, Eq)]
struct Header {
    dtype: Dtype,
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Value following `'key':` in the header dictionary.
fn header_value<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let needle = format!("'{key}':");
    let start = dict
        .find(&needle)
        .ok_or_else(|| LifeError::npy(format!("header is missing '{key}'")))?;
    Ok(dict[start + needle.len()..].trim_start())
}

fn parse_header(dict: &str) -> Result<Header> {
    let descr = header_value(dict, "descr")?;
    let descr = descr
        .strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| LifeError::npy("descr is not a quoted string"))?;
    let dtype = Dtype::parse(descr)?;

    let fortran = header_value(dict, "fortran_order")?;
    let fortran_order = if fortran.starts_with("True") {
        true
    } else if fortran.starts_with("False") {
        false
    } else {
        return Err(LifeError::npy("fortran_order is not a boolean"));
    };

    let shape = header_value(dict, "shape")?;
    let inner = shape
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| LifeError::npy("shape is not a tuple"))?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| LifeError::npy(format!("bad shape entry '{s}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Header {
        dtype,
        fortran_order,
        shape,
    })
}

/// Decode a complete `.npy` byte buffer into a grid.
pub fn decode_npy(bytes: &[u8]) -> Result<Grid> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(LifeError::npy("missing NPY magic"));
    }
    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(LifeError::npy("truncated header length"));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => return Err(LifeError::npy(format!("unsupported format version {v}"))),
    };

    let data_start = header_start + header_len;
    let dict = bytes
        .get(header_start..data_start)
        .ok_or_else(|| LifeError::npy("truncated header"))?;
    let dict = std::str::from_utf8(dict).map_err(|_| LifeError::npy("header is not text"))?;
    let header = parse_header(dict)?;

    let side = match header.shape.as_slice() {
        &[a, b, c] if a == b && b == c => a,
        other => return Err(LifeError::ShapeMismatch(other.to_vec())),
    };

    let count = cell_count(side)?;
    let width = header.dtype.width;
    let data_end = count
        .checked_mul(width)
        .and_then(|len| len.checked_add(data_start))
        .ok_or_else(|| LifeError::npy("shape too large"))?;
    let payload = bytes
        .get(data_start..data_end)
        .ok_or_else(|| LifeError::npy("payload shorter than shape"))?;

    let mut cells = vec![0u8; count];
    for (i, chunk) in payload.chunks_exact(width).enumerate() {
        let value = header.dtype.decode(chunk);
        let cell = if value == 0.0 {
            0
        } else if value == 1.0 {
            1
        } else {
            return Err(LifeError::NonBinaryCell { index: i, value });
        };
        // Fortran order stores axis 0 fastest, which is C order transposed.
        let target = if header.fortran_order {
            let a0 = i % side;
            let a1 = (i / side) % side;
            let a2 = i / (side * side);
            a0 * side * side + a1 * side + a2
        } else {
            i
        };
        cells[target] = cell;
    }

    from_cells(side, cells)
}

/// Encode a grid as a format 1.0 `.npy` buffer.
pub fn encode_npy(grid: &Grid) -> Vec<u8> {
    let n = grid.side;
    let mut dict = format!("{{'descr': '|u1', 'fortran_order': False, 'shape': ({n}, {n}, {n}), }}");
    // Magic, version and length take 10 bytes; the newline terminates the header.
    let unpadded = MAGIC.len() + 4 + dict.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    dict.extend(std::iter::repeat(' ').take(padding));
    dict.push('\n');

    let mut out = Vec::with_capacity(10 + dict.len() + grid.cells.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend_from_slice(&grid.cells);
    out
}

/// Resolve a user-supplied automaton name against the storage directory.
///
/// Names that already mention the directory are used as given. A bare name
/// without extension falls back to `<name>.npy` when only that exists.
pub fn resolve_automaton_path(dir: &Path, name: &str) -> PathBuf {
    let dir_str = dir.to_string_lossy();
    let trimmed = dir_str.trim_end_matches(&['/', '\\'][..]);
    let candidate = if !trimmed.is_empty() && name.contains(trimmed) {
        PathBuf::from(name)
    } else {
        dir.join(name)
    };

    if candidate.exists() || candidate.extension().is_some() {
        return candidate;
    }
    let with_ext = candidate.with_extension(NPY_EXTENSION);
    if with_ext.exists() {
        with_ext
    } else {
        candidate
    }
}

/// Load a grid from a `.npy` file.
pub fn load_grid(path: &Path) -> Result<Grid> {
    let bytes = fs::read(path).map_err(|e| LifeError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let grid = decode_npy(&bytes).map_err(|e| e.while_loading(path))?;
    info!(path = %path.display(), side = grid.side, "automaton loaded");
    Ok(grid)
}

/// Write a grid to an explicit path.
pub fn save_grid_to(grid: &Grid, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, encode_npy(grid))?;
    info!(path = %path.display(), "automaton saved");
    Ok(())
}

/// File name for a save made at `timestamp` (Unix seconds).
pub fn timestamped_name(timestamp: i64) -> String {
    format!("automaton{timestamp}.{NPY_EXTENSION}")
}

/// Save a grid into `dir` under a name carrying the current Unix time.
pub fn save_grid(grid: &Grid, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(timestamped_name(chrono::Utc::now().timestamp()));
    save_grid_to(grid, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::{axis_seed, create_grid, get_cell, population, set_cell};

    fn npy_with(descr: &str, fortran: bool, shape: &str, payload: &[u8]) -> Vec<u8> {
        let dict = format!(
            "{{'descr': '{descr}', 'fortran_order': {}, 'shape': {shape}, }}\n",
            if fortran { "True" } else { "False" }
        );
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_header_is_aligned() {
        let bytes = encode_npy(&create_grid(50).unwrap());
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % HEADER_ALIGN, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 125_000);
    }

    #[test]
    fn test_encode_decode_preserves_cells() {
        let mut grid = axis_seed(6).unwrap();
        set_cell(&mut grid, 2, 3, 4, true);
        let decoded = decode_npy(&encode_npy(&grid)).unwrap();
        assert_eq!(decoded.cells, grid.cells);
        assert_eq!(decoded.side, 6);
    }

    #[test]
    fn test_decode_float64_c_order() {
        let mut payload = Vec::new();
        for i in 0..8 {
            let v: f64 = if i == 1 { 1.0 } else { 0.0 };
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let grid = decode_npy(&npy_with("<f8", false, "(2, 2, 2)", &payload)).unwrap();
        // Flat index 1 is array [0, 0, 1], i.e. x = 1
        assert!(get_cell(&grid, 1, 0, 0));
        assert_eq!(population(&grid), 1);
    }

    #[test]
    fn test_decode_fortran_order_transposes() {
        let mut payload = vec![0u8; 8];
        // Fortran flat index 1 is array [1, 0, 0], i.e. z = 1
        payload[1] = 1;
        let grid = decode_npy(&npy_with("|b1", true, "(2, 2, 2)", &payload)).unwrap();
        assert!(get_cell(&grid, 0, 0, 1));
        assert_eq!(population(&grid), 1);
    }

    #[test]
    fn test_decode_big_endian_int() {
        let mut payload = Vec::new();
        for i in 0..8i32 {
            payload.extend_from_slice(&(i % 2).to_be_bytes());
        }
        let grid = decode_npy(&npy_with(">i4", false, "(2, 2, 2)", &payload)).unwrap();
        assert_eq!(population(&grid), 4);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode_npy(b"not an npy"), Err(LifeError::Npy(_))));
        assert!(matches!(
            decode_npy(&npy_with("|u1", false, "(2, 2)", &[0; 4])),
            Err(LifeError::ShapeMismatch(_))
        ));
        assert!(matches!(
            decode_npy(&npy_with("|u1", false, "(3, 3, 3)", &[0; 27])),
            Err(LifeError::OddGridSize(3))
        ));
        assert!(matches!(
            decode_npy(&npy_with("|u1", false, "(2, 2, 2)", &[0, 0, 5, 0, 0, 0, 0, 0])),
            Err(LifeError::NonBinaryCell { index: 2, .. })
        ));
        assert!(matches!(
            decode_npy(&npy_with("|u1", false, "(2, 2, 2)", &[0; 5])),
            Err(LifeError::Npy(_))
        ));
        assert!(matches!(
            decode_npy(&npy_with("<c16", false, "(2, 2, 2)", &[0; 128])),
            Err(LifeError::Npy(_))
        ));
    }

    #[test]
    fn test_decode_rejects_overflowing_shape() {
        let huge = "(4194304, 4194304, 4194304)";
        assert!(matches!(
            decode_npy(&npy_with("|u1", false, huge, &[0; 8])),
            Err(LifeError::GridTooLarge(4194304))
        ));
        // Fits as a cell count, but not once multiplied by the element width
        let side = 1usize << 21;
        let shape = format!("({side}, {side}, {side})");
        assert!(matches!(
            decode_npy(&npy_with("<f8", false, &shape, &[0; 8])),
            Err(LifeError::Npy(_))
        ));
    }

    #[test]
    fn test_decode_negative_int_is_not_binary() {
        let mut payload = Vec::new();
        for i in 0..8i16 {
            payload.extend_from_slice(&(if i == 0 { -1i16 } else { 0 }).to_le_bytes());
        }
        match decode_npy(&npy_with("<i2", false, "(2, 2, 2)", &payload)) {
            Err(LifeError::NonBinaryCell { index, value }) => {
                assert_eq!(index, 0);
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_timestamped_name() {
        assert_eq!(timestamped_name(1_700_000_000), "automaton1700000000.npy");
    }

    #[test]
    fn test_resolve_automaton_path() {
        let dir = Path::new("automaton_examples/");
        assert_eq!(
            resolve_automaton_path(dir, "glider.npy"),
            PathBuf::from("automaton_examples/glider.npy")
        );
        assert_eq!(
            resolve_automaton_path(dir, "automaton_examples/glider.npy"),
            PathBuf::from("automaton_examples/glider.npy")
        );
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let path = std::env::temp_dir().join("voxel-life-definitely-missing.npy");
        assert!(matches!(load_grid(&path), Err(LifeError::Load { .. })));
    }
}
