use std::fmt::Display;
use std::str::FromStr;

use crate::core::scan::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ValueType {
    pub const ALL: [ValueType; 10] = [
        ValueType::I8,
        ValueType::I16,
        ValueType::I32,
        ValueType::I64,
        ValueType::U8,
        ValueType::U16,
        ValueType::U32,
        ValueType::U64,
        ValueType::F32,
        ValueType::F64,
    ];

    pub fn size(&self) -> usize {
        match self {
            ValueType::I8 | ValueType::U8 => 1,
            ValueType::I16 | ValueType::U16 => 2,
            ValueType::I32 | ValueType::U32 | ValueType::F32 => 4,
            ValueType::I64 | ValueType::U64 | ValueType::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::I8 => "int8",
            ValueType::I16 => "int16",
            ValueType::I32 => "int32",
            ValueType::I64 => "int64",
            ValueType::U8 => "uint8",
            ValueType::U16 => "uint16",
            ValueType::U32 => "uint32",
            ValueType::U64 => "uint64",
            ValueType::F32 => "float32",
            ValueType::F64 => "double64",
        }
    }

    /// Little-endian bytes of `text` read as this type.
    ///
    /// Integers may be written in either their signed or unsigned spelling: anything in
    /// `[-(2^(n-1)), 2^n - 1]` is accepted and masked to the type width, so `-1` is a valid
    /// `uint32` and `4294967295` a valid `int32`.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, ScanError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScanError::EmptyValue);
        }

        let invalid = || ScanError::InvalidValue {
            value: text.to_owned(),
            value_type: *self,
        };

        match self {
            ValueType::F32 => {
                let value = text.parse::<f32>().map_err(|_| invalid())?;
                Ok(value.to_le_bytes().to_vec())
            }
            ValueType::F64 => {
                let value = text.parse::<f64>().map_err(|_| invalid())?;
                Ok(value.to_le_bytes().to_vec())
            }
            _ => {
                let bits = (self.size() * 8) as u32;
                let min = -(1_i128 << (bits - 1));
                let max = (1_i128 << bits) - 1;
                let value = text.parse::<i128>().map_err(|_| invalid())?;
                if value < min || value > max {
                    return Err(invalid());
                }

                Ok((value as u128).to_le_bytes()[..self.size()].to_vec())
            }
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, ScanError> {
        if bytes.len() != self.size() {
            return Err(ScanError::TypeMismatch {
                value_type: *self,
                len: bytes.len(),
            });
        }

        // length checked above
        let text = match self {
            ValueType::I8 => i8::from_le_bytes([bytes[0]]).to_string(),
            ValueType::U8 => bytes[0].to_string(),
            ValueType::I16 => i16::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::U16 => u16::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::I32 => i32::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::U32 => u32::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::I64 => i64::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::U64 => u64::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::F32 => f32::from_le_bytes(le_array(bytes)).to_string(),
            ValueType::F64 => f64::from_le_bytes(le_array(bytes)).to_string(),
        };

        Ok(text)
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ValueType {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int8" | "i8" => Ok(ValueType::I8),
            "int16" | "i16" => Ok(ValueType::I16),
            "int32" | "i32" => Ok(ValueType::I32),
            "int64" | "i64" => Ok(ValueType::I64),
            "uint8" | "u8" => Ok(ValueType::U8),
            "uint16" | "u16" => Ok(ValueType::U16),
            "uint32" | "u32" => Ok(ValueType::U32),
            "uint64" | "u64" => Ok(ValueType::U64),
            "float32" | "f32" | "float" => Ok(ValueType::F32),
            "double64" | "f64" | "double" => Ok(ValueType::F64),
            _ => Err(ScanError::UnknownType(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("UINT32".parse::<ValueType>(), Ok(ValueType::U32));
        assert_eq!("i64".parse::<ValueType>(), Ok(ValueType::I64));
        assert_eq!("double64".parse::<ValueType>(), Ok(ValueType::F64));
        assert_eq!(
            "string".parse::<ValueType>(),
            Err(ScanError::UnknownType("string".to_owned()))
        );
        for value_type in ValueType::ALL {
            assert_eq!(value_type.name().parse::<ValueType>(), Ok(value_type));
        }
    }

    #[test]
    fn test_sizes() {
        let sizes: Vec<usize> = ValueType::ALL.iter().map(|t| t.size()).collect();
        assert_eq!(sizes, vec![1, 2, 4, 8, 1, 2, 4, 8, 4, 8]);
    }

    #[test]
    fn test_encode_integers() {
        assert_eq!(ValueType::U32.encode("31337").unwrap(), 31337_u32.to_le_bytes());
        assert_eq!(ValueType::U32.encode("-1").unwrap(), vec![0xff; 4]);
        assert_eq!(ValueType::I32.encode("4294967295").unwrap(), vec![0xff; 4]);
        assert_eq!(ValueType::I8.encode("-128").unwrap(), vec![0x80]);
        assert_eq!(ValueType::U64.encode("18446744073709551615").unwrap(), vec![0xff; 8]);
        assert_eq!(ValueType::I16.encode(" 258 ").unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_encode_rejects() {
        assert_eq!(ValueType::U8.encode(""), Err(ScanError::EmptyValue));
        assert!(matches!(
            ValueType::U8.encode("256"),
            Err(ScanError::InvalidValue { .. })
        ));
        assert!(matches!(
            ValueType::I8.encode("-129"),
            Err(ScanError::InvalidValue { .. })
        ));
        assert!(matches!(
            ValueType::U32.encode("12abc"),
            Err(ScanError::InvalidValue { .. })
        ));
        assert!(matches!(
            ValueType::F32.encode("one"),
            Err(ScanError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_floats() {
        let bytes = ValueType::F32.encode("1.5").unwrap();
        assert_eq!(bytes, 1.5_f32.to_le_bytes());
        assert_eq!(ValueType::F32.decode(&bytes).unwrap(), "1.5");
        let bytes = ValueType::F64.encode("-0.25").unwrap();
        assert_eq!(ValueType::F64.decode(&bytes).unwrap(), "-0.25");
    }

    #[test]
    fn test_decode_signedness() {
        let bytes = [0xff, 0xff, 0xff, 0xff];
        assert_eq!(ValueType::U32.decode(&bytes).unwrap(), "4294967295");
        assert_eq!(ValueType::I32.decode(&bytes).unwrap(), "-1");
        assert_eq!(ValueType::I8.decode(&[0x80]).unwrap(), "-128");
    }

    #[test]
    fn test_decode_length_mismatch() {
        assert_eq!(
            ValueType::U64.decode(&[1, 2, 3, 4]),
            Err(ScanError::TypeMismatch {
                value_type: ValueType::U64,
                len: 4
            })
        );
    }
}
