use std::error;
use std::fmt;
use std::fs;
use std::path::Path;

mod npy;

pub use npy::parse_npy;

// row-major numeric array as loaded from disk
#[derive(Debug, Clone, PartialEq)]
pub struct NumArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        let count: usize = shape.iter().product();
        if count != data.len() {
            panic!("shape does not match value count");
        }

        NumArray { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    pub fn rows(&self) -> usize {
        match self.dim() {
            2 => self.shape[0],
            _ => panic!("bad dim"),
        }
    }

    pub fn cols(&self) -> usize {
        match self.dim() {
            2 => self.shape[1],
            _ => panic!("bad dim"),
        }
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        let nc = self.cols();
        if r >= self.rows() || c >= nc {
            panic!("array index out of bounds");
        }

        self.data[r * nc + c]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    // min and max over all stored values
    pub fn value_bounds(&self) -> (f64, f64) {
        bounds(self.data.iter().cloned())
    }

    // min and max over a single column of a 2d array
    pub fn col_bounds(&self, c: usize) -> (f64, f64) {
        let nc = self.cols();
        if c >= nc {
            panic!("array index out of bounds");
        }

        bounds(self.data.iter().cloned().skip(c).step_by(nc))
    }
}

fn bounds<I: Iterator<Item = f64>>(vals: I) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in vals {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    if min > max {
        panic!("empty value range");
    }

    (min, max)
}

pub fn read_array<P: AsRef<Path>>(path: P) -> Result<NumArray, FileError> {
    let ext = path
        .as_ref()
        .extension()
        .map_or(Err(FileError::NoExt), |e| Ok(e))?;
    let ext = ext.to_str().ok_or(FileError::NonUniPath)?.to_string();

    match ext.as_str() {
        "npy" => {
            let bytes = fs::read(path).or(Err(FileError::NoOpen))?;
            npy::parse_npy(&bytes)
        }
        _ => Err(FileError::BadType(ext)),
    }
}

#[derive(Debug, Clone)]
pub enum FileError {
    NoExt,
    NoOpen,
    NonUniPath,
    BadParse(String),
    BadType(String),
    BadDtype(String),
}

impl error::Error for FileError {}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FileError: ")?;
        match self {
            FileError::NoExt => {
                write!(f, "cannot read file extension")
            }
            FileError::NoOpen => {
                write!(f, "cannot open file")
            }
            FileError::NonUniPath => {
                write!(f, "non-unicode path")
            }
            FileError::BadType(s) => {
                write!(f, "unsupported file type: {}", s)
            }
            FileError::BadParse(s) => {
                write!(f, "bad parse: {}", s)
            }
            FileError::BadDtype(s) => {
                write!(f, "unsupported array dtype: {}", s)
            }
        }
    }
}

impl FileError {
    pub fn parse<T: ToString>(msg: T) -> Self {
        Self::BadParse(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{read_array, FileError, NumArray};

    #[test]
    fn extension_handling() {
        assert!(matches!(read_array("no_such"), Err(FileError::NoExt)));
        assert!(matches!(
            read_array("no_such.txt"),
            Err(FileError::BadType(_))
        ));
        assert!(matches!(read_array("no_such.npy"), Err(FileError::NoOpen)));
    }

    #[test]
    fn array_accessors() {
        let arr = NumArray::new(vec![2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(arr.dim(), 2);
        assert_eq!(arr.rows(), 2);
        assert_eq!(arr.cols(), 3);
        assert_eq!(arr.get(1, 2), 5.0);
        assert_eq!(arr.value_bounds(), (0.0, 5.0));
        assert_eq!(arr.col_bounds(1), (1.0, 4.0));
    }
}
