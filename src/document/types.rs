//! Instruction types for a parsed ePOS-Print document.

/// A monochrome bitmap carried by an `<image>` element.
///
/// `data` is 1 bit per dot, row-major, MSB = leftmost dot, already
/// base64-decoded. The parser guarantees
/// `data.len() == (width / 8) * height` (truncating division on `width`).
///
/// Dimensions are kept signed because the parser accepts whatever the
/// attributes say and lets the byte-count check reject nonsense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width in dots
    pub width: i64,
    /// Height in dots (rows)
    pub height: i64,
    /// Packed raster bytes
    pub data: Vec<u8>,
}

impl Image {
    /// Number of bytes the declared dimensions call for.
    ///
    /// Wraps on overflow so absurd dimensions surface as a size mismatch
    /// rather than a panic.
    pub fn expected_len(width: i64, height: i64) -> i64 {
        (width / 8).wrapping_mul(height)
    }
}

/// One print instruction, in the order it appeared in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Print a raster image
    Image(Image),
    /// Kick the cash drawer
    Pulse,
    /// Cut the paper
    Cut,
}

impl Instruction {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Image(_) => "image",
            Instruction::Pulse => "pulse",
            Instruction::Cut => "cut",
        }
    }
}

/// An ordered sequence of instructions. Execution order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EposDocument {
    /// Namespace URI of the `epos-print` root, if one was seen
    pub root_namespace: Option<String>,
    /// Instructions in document order
    pub instructions: Vec<Instruction>,
}

impl EposDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

impl<'a> IntoIterator for &'a EposDocument {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
