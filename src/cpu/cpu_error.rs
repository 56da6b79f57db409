/*
 * Filename: /src/cpu/cpu_error.rs
 * Project: m6502emu
 * Created Date: Saturday, July 5rd 2021, 09:11:09 am
 * Author: valerino <xoanino@gmail.com>
 * Copyright (c) 2021 valerino
 *
 * MIT License
 *
 * Copyright (c) 2021 valerino
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of
 * this software and associated documentation files (the "Software"), to deal in
 * the Software without restriction, including without limitation the rights to
 * use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies
 * of the Software, and to permit persons to whom the Software is furnished to do
 * so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use std::fmt;

/**
 * type of cpu error.
 */
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ErrorType {
    /// memory access outside the addressable range.
    OutOfRangeAddress,
    /// fetched byte is not in the opcode table.
    InvalidOpcode,
}
pub type CpuErrorType = self::ErrorType;

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::OutOfRangeAddress => write!(f, "OutOfRangeAddress"),
            ErrorType::InvalidOpcode => write!(f, "InvalidOpcode"),
        }
    }
}

/**
 * the memory operation which caused an OutOfRangeAddress error.
 */
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum MemoryOperation {
    Read,
    Write,
    Load,
}

impl std::fmt::Display for MemoryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryOperation::Read => write!(f, "MemRead"),
            MemoryOperation::Write => write!(f, "MemWrite"),
            MemoryOperation::Load => write!(f, "MemLoad"),
        }
    }
}

/**
 * to report errors within the whole crate
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub t: ErrorType,
    operation: Option<MemoryOperation>,
    address: usize,
    access_size: usize,
    mem_size: usize,
    opcode: u8,
}
pub type CpuError = self::Error;

impl std::error::Error for CpuError {}

impl std::fmt::Display for CpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        match self.t {
            ErrorType::InvalidOpcode => write!(
                f,
                "Error ({}) opcode=${:02x} at address=${:04x}",
                self.t, self.opcode, self.address
            ),
            ErrorType::OutOfRangeAddress => write!(
                f,
                "Error ({}, {}) at address=${:x}, access size={}, max memory size={}",
                self.t,
                self.operation.unwrap_or(MemoryOperation::Read),
                self.address,
                self.access_size,
                self.mem_size,
            ),
        }
    }
}

impl CpuError {
    /**
     * the offending opcode (meaningful for InvalidOpcode only).
     */
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /**
     * the address the error refers to.
     */
    pub fn address(&self) -> usize {
        self.address
    }

    /**
     * the memory operation which failed, if any.
     */
    pub fn operation(&self) -> Option<MemoryOperation> {
        self.operation
    }
}

/**
 * creates an invalid opcode error, address is where the opcode has been fetched from.
 */
pub(crate) fn new_invalid_opcode_error(address: usize, opcode: u8) -> CpuError {
    CpuError {
        t: ErrorType::InvalidOpcode,
        operation: None,
        address: address,
        access_size: 0,
        mem_size: 0,
        opcode: opcode,
    }
}

/**
 * check memory boundaries during access
 */
pub(crate) fn check_address_boundaries(
    mem_size: usize,
    address: usize,
    access_size: usize,
    op: MemoryOperation,
) -> Result<(), CpuError> {
    // check if memory access overflows
    let end = address.checked_add(access_size);
    if end.is_none() || end.unwrap_or_default() > mem_size {
        // report read, write or load error
        let e = CpuError {
            t: ErrorType::OutOfRangeAddress,
            operation: Some(op),
            address: address,
            access_size: access_size,
            mem_size: mem_size,
            opcode: 0,
        };
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert!(check_address_boundaries(0x10000, 0xffff, 1, MemoryOperation::Read).is_ok());
        assert!(check_address_boundaries(0x10000, 0, 0x10000, MemoryOperation::Load).is_ok());

        let e = check_address_boundaries(0x10000, 0xffff, 2, MemoryOperation::Read).unwrap_err();
        assert_eq!(e.t, ErrorType::OutOfRangeAddress);
        assert_eq!(e.operation(), Some(MemoryOperation::Read));
        assert_eq!(e.address(), 0xffff);

        let e = check_address_boundaries(0x10000, usize::MAX, 2, MemoryOperation::Write).unwrap_err();
        assert_eq!(e.operation(), Some(MemoryOperation::Write));
    }

    #[test]
    fn display() {
        let e = new_invalid_opcode_error(0x1000, 0xff);
        assert_eq!(e.to_string(), "Error (InvalidOpcode) opcode=$ff at address=$1000");
        assert_eq!(e.opcode(), 0xff);
        assert!(e.operation().is_none());

        let e = check_address_boundaries(0x10000, 0x10000, 1, MemoryOperation::Write).unwrap_err();
        assert_eq!(
            e.to_string(),
            "Error (OutOfRangeAddress, MemWrite) at address=$10000, access size=1, max memory size=65536"
        );
    }
}
