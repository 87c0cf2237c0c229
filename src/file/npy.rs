use std::convert::TryInto;

use nom::IResult;

use super::{FileError, NumArray};

// reader for the numpy binary array format
// header layout notes are at the bottom of the file

struct NpyHeader {
    descr: String,
    fortran_order: bool,
    shape: Vec<usize>,
}

pub fn parse_npy(bytes: &[u8]) -> Result<NumArray, FileError> {
    if !bytes.starts_with(b"\x93NUMPY") {
        return Err(FileError::parse("not an npy file (bad magic)"));
    }

    let (payload, header_bytes) =
        prelude(bytes).map_err(|_| FileError::parse("bad npy prelude"))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|_| FileError::parse("non-utf8 npy header"))?;
    let (_, header) =
        header_dict(header_text).map_err(|_| FileError::parse("bad npy header dict"))?;

    if header.fortran_order {
        return Err(FileError::parse("fortran ordered arrays are unsupported"));
    }

    let count: usize = header.shape.iter().product();

    let data: Vec<f64> = match header.descr.as_str() {
        "<f8" => {
            if payload.len() < count * 8 {
                return Err(FileError::parse("truncated data section"));
            }
            payload
                .chunks_exact(8)
                .take(count)
                .map(|c| f64::from_le_bytes(c.try_into().expect("unreachable")))
                .collect()
        }
        "<f4" => {
            if payload.len() < count * 4 {
                return Err(FileError::parse("truncated data section"));
            }
            payload
                .chunks_exact(4)
                .take(count)
                .map(|c| f32::from_le_bytes(c.try_into().expect("unreachable")) as f64)
                .collect()
        }
        d => return Err(FileError::BadDtype(d.to_string())),
    };

    Ok(NumArray::new(header.shape, data))
}

fn prelude(input: &[u8]) -> IResult<&[u8], &[u8]> {
    // magic, version pair, then the length-prefixed header text
    use nom::bytes::complete::{tag, take};
    use nom::error::ErrorKind;
    use nom::number::complete::{le_u16, le_u32, le_u8};

    let (input, _) = tag(&b"\x93NUMPY"[..])(input)?;
    let (input, major) = le_u8(input)?;
    let (input, _minor) = le_u8(input)?;

    match major {
        1 => {
            let (input, len) = le_u16(input)?;
            take(len as usize)(input)
        }
        2 => {
            let (input, len) = le_u32(input)?;
            take(len as usize)(input)
        }
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        ))),
    }
}

fn header_dict(input: &str) -> IResult<&str, NpyHeader> {
    use nom::branch::alt;
    use nom::bytes::complete::{tag, take_until};
    use nom::character::complete::{self, space0};
    use nom::combinator::{map, opt, value};
    use nom::multi::separated_list0;
    use nom::sequence::preceded;

    let (input, _) = tag("{'descr': '")(input)?;
    let (input, descr) = take_until("'")(input)?;
    let (input, _) = tag("', 'fortran_order': ")(input)?;
    let (input, fortran_order) = alt((value(false, tag("False")), value(true, tag("True"))))(input)?;
    let (input, _) = tag(", 'shape': (")(input)?;
    let (input, shape) = separated_list0(
        tag(","),
        preceded(space0, map(complete::u64, |x| x as usize)),
    )(input)?;
    let (input, _) = opt(tag(","))(input)?;
    let (input, _) = tag(")")(input)?;

    Ok((
        input,
        NpyHeader {
            descr: descr.to_string(),
            fortran_order,
            shape,
        },
    ))
}

// NPY format, as written by numpy.save:
// - 6 magic bytes \x93NUMPY, then one byte each for major and minor version
// - header length as little-endian u16 (v1.x) or u32 (v2.x)
// - that many bytes of python dict literal, space-padded, e.g.
//   {'descr': '<f8', 'fortran_order': False, 'shape': (3, 4), }
//   numpy always writes the keys in this order; 1d shapes look like (12,)
//   and 0d shapes like ()
// - the flat data section, in the byte order given by the descr prefix
// Only little-endian C-order float arrays are accepted here.

#[cfg(test)]
mod tests {
    use super::super::FileError;
    use super::parse_npy;

    fn npy_bytes(descr: &str, shape: &str, data: &[u8]) -> Vec<u8> {
        let mut header = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
            descr, shape
        )
        .into_bytes();
        header.push(b'\n');

        let mut out = b"\x93NUMPY".to_vec();
        out.push(1);
        out.push(0);
        out.extend(&(header.len() as u16).to_le_bytes());
        out.extend(header);
        out.extend(data);
        out
    }

    fn f8_data(vals: &[f64]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
    }

    #[test]
    fn two_d_f8() {
        let bytes = npy_bytes("<f8", "(2, 3)", &f8_data(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
        let arr = parse_npy(&bytes).unwrap();

        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr.get(0, 1), 1.0);
        assert_eq!(arr.get(1, 2), 5.0);
    }

    #[test]
    fn one_d_f8() {
        let bytes = npy_bytes("<f8", "(4,)", &f8_data(&[1.5, -2.5, 0.0, 12.0]));
        let arr = parse_npy(&bytes).unwrap();

        assert_eq!(arr.shape(), &[4]);
        assert_eq!(arr.values(), &[1.5, -2.5, 0.0, 12.0]);
    }

    #[test]
    fn two_d_f4() {
        let data: Vec<u8> = [0.5f32, 1.5, 2.5, 3.5]
            .iter()
            .flat_map(|v| v.to_le_bytes().to_vec())
            .collect();
        let bytes = npy_bytes("<f4", "(2, 2)", &data);
        let arr = parse_npy(&bytes).unwrap();

        assert_eq!(arr.shape(), &[2, 2]);
        assert_eq!(arr.get(1, 0), 2.5);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = npy_bytes("<f8", "(1,)", &f8_data(&[1.0]));
        bytes[0] = b'x';

        assert!(matches!(parse_npy(&bytes), Err(FileError::BadParse(_))));
    }

    #[test]
    fn rejects_fortran_order() {
        let header = b"{'descr': '<f8', 'fortran_order': True, 'shape': (1,), }\n";
        let mut bytes = b"\x93NUMPY".to_vec();
        bytes.push(1);
        bytes.push(0);
        bytes.extend(&(header.len() as u16).to_le_bytes());
        bytes.extend(&header[..]);
        bytes.extend(f8_data(&[1.0]));

        assert!(matches!(parse_npy(&bytes), Err(FileError::BadParse(_))));
    }

    #[test]
    fn rejects_truncated_data() {
        let bytes = npy_bytes("<f8", "(3,)", &f8_data(&[1.0, 2.0]));

        assert!(matches!(parse_npy(&bytes), Err(FileError::BadParse(_))));
    }

    #[test]
    fn rejects_integer_dtype() {
        let bytes = npy_bytes("<i8", "(1,)", &f8_data(&[0.0]));

        assert!(matches!(parse_npy(&bytes), Err(FileError::BadDtype(_))));
    }
}
