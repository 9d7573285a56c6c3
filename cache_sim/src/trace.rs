use std::fmt;

use nom::{
    character::complete::{char, hex_digit1, one_of, space0, space1, u32},
    combinator::{all_consuming, map_res},
    IResult,
};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

use crate::address::Addr;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TraceError {
    #[error("malformed trace at line {line}: `{content}`")]
    Malformed { line: usize, content: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Operation {
    Load = b'L',
    Store = b'S',
    /// a load followed by a store to the same address
    Modify = b'M',
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(u8::from(*self)))
    }
}

/// one data access of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub op: Operation,
    pub addr: Addr,
    /// bytes touched; carried for display only
    pub size: u32,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {},{}", self.op, self.addr, self.size)
    }
}

/// data accesses of a valgrind (lackey) memory trace, in file order.
#[derive(Default, Debug)]
pub struct Trace {
    accesses: Vec<Access>,
}

impl std::ops::Deref for Trace {
    type Target = [Access];

    fn deref(&self) -> &Self::Target {
        &self.accesses
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Access;

    type IntoIter = std::slice::Iter<'a, Access>;

    fn into_iter(self) -> Self::IntoIter {
        self.accesses.iter()
    }
}

impl Trace {
    /// instruction fetches (`I ...`) and blank lines are skipped.
    pub fn parse(trace_str: &str) -> Result<Self, TraceError> {
        let mut accesses = Vec::new();
        for (index, line) in trace_str.lines().enumerate() {
            if line.starts_with('I') || line.trim().is_empty() {
                continue;
            }
            let (_, access) =
                all_consuming(read_access)(line).map_err(|_| TraceError::Malformed {
                    line: index + 1,
                    content: line.to_owned(),
                })?;
            accesses.push(access);
        }
        Ok(Self { accesses })
    }
}

impl FromIterator<Access> for Trace {
    fn from_iter<T: IntoIterator<Item = Access>>(iter: T) -> Self {
        Self {
            accesses: iter.into_iter().collect(),
        }
    }
}

fn read_operation(input: &str) -> IResult<&str, Operation> {
    map_res(one_of("LSM"), |c: char| {
        Operation::try_from_primitive(c as u8)
    })(input)
}

fn read_addr(input: &str) -> IResult<&str, Addr> {
    map_res(hex_digit1, |s: &str| {
        u64::from_str_radix(s, 16).map(Addr::new)
    })(input)
}

fn read_access(input: &str) -> IResult<&str, Access> {
    let (input, _) = space0(input)?;
    let (input, op) = read_operation(input)?;
    let (input, _) = space1(input)?;
    let (input, addr) = read_addr(input)?;
    let (input, _) = char(',')(input)?;
    let (input, size) = u32(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Access { op, addr, size }))
}
