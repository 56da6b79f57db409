/*
 * Filename: /src/memory.rs
 * Project: m6502emu
 * Created Date: 2021-08-09, 12:46:02
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

use crate::cpu::cpu_error;
use crate::cpu::cpu_error::{CpuError, MemoryOperation};
use byteorder::{ByteOrder, LittleEndian};
use hexplay::HexViewBuilder;

/**
 * the emulated memory exposed by the cpu: the whole 6502 address space as a flat byte array.
 *
 * page 0 ($0000-$00ff) is the zeropage, page 1 ($0100-$01ff) holds the stack. both are conventions only.
 */
#[derive(Debug, Clone)]
pub struct Memory {
    m: Vec<u8>,
}

impl Memory {
    /// size of the 6502 address space.
    pub const MAX_SIZE: usize = 0x10000;

    /**
     * returns a new, zeroed, memory spanning the whole address space.
     */
    pub fn new() -> Memory {
        Memory {
            m: vec![0; Memory::MAX_SIZE],
        }
    }

    /**
     * reads a byte at address.
     */
    pub fn read_byte(&self, address: usize) -> Result<u8, CpuError> {
        cpu_error::check_address_boundaries(self.size(), address, 1, MemoryOperation::Read)?;
        Ok(self.m[address])
    }

    /**
     * writes a byte at address.
     */
    pub fn write_byte(&mut self, address: usize, b: u8) -> Result<(), CpuError> {
        cpu_error::check_address_boundaries(self.size(), address, 1, MemoryOperation::Write)?;
        self.m[address] = b;
        Ok(())
    }

    /**
     * reads a word (little-endian) at address.
     *
     * this is a raw access, the cpu uses its own (cycle counted) primitives.
     */
    pub fn read_word_le(&self, address: usize) -> Result<u16, CpuError> {
        cpu_error::check_address_boundaries(self.size(), address, 2, MemoryOperation::Read)?;
        Ok(LittleEndian::read_u16(&self.m[address..address + 2]))
    }

    /**
     * writes a word (little-endian) at address.
     */
    pub fn write_word_le(&mut self, address: usize, w: u16) -> Result<(), CpuError> {
        cpu_error::check_address_boundaries(self.size(), address, 2, MemoryOperation::Write)?;
        LittleEndian::write_u16(&mut self.m[address..address + 2], w);
        Ok(())
    }

    /**
     * copies data (i.e. a program) in memory at address.
     */
    pub fn load(&mut self, address: usize, data: &[u8]) -> Result<(), CpuError> {
        cpu_error::check_address_boundaries(
            self.size(),
            address,
            data.len(),
            MemoryOperation::Load,
        )?;
        self.m[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    /**
     * fill memory with zeroes.
     */
    pub fn clear(&mut self) {
        for b in self.m.iter_mut() {
            *b = 0;
        }
    }

    /**
     * get memory size.
     */
    pub fn size(&self) -> usize {
        self.m.len()
    }

    /**
     * gets a reference to the underlying buffer.
     */
    pub fn as_vec(&self) -> &Vec<u8> {
        &self.m
    }

    /**
     * returns an hexdump of len bytes at address.
     */
    pub fn dump(&self, address: usize, len: usize) -> Result<String, CpuError> {
        cpu_error::check_address_boundaries(self.size(), address, len, MemoryOperation::Read)?;
        let dump = HexViewBuilder::new(&self.m[address..address + len])
            .address_offset(address)
            .row_width(16)
            .finish();
        Ok(format!("{}", dump))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::cpu_error::ErrorType;

    #[test]
    fn read_write() {
        let mut m = Memory::new();
        assert_eq!(m.size(), 0x10000);
        assert_eq!(m.read_byte(123).unwrap(), 0);

        m.write_byte(123, 0xaa).unwrap();
        assert_eq!(m.read_byte(123).unwrap(), 0xaa);
        m.write_byte(0xffff, 0xfc).unwrap();
        assert_eq!(m.read_byte(0xffff).unwrap(), 0xfc);
    }

    #[test]
    fn out_of_range() {
        let mut m = Memory::new();
        let e = m.read_byte(0x10000).unwrap_err();
        assert_eq!(e.t, ErrorType::OutOfRangeAddress);
        assert_eq!(e.operation(), Some(MemoryOperation::Read));

        let e = m.write_byte(0x10000, 1).unwrap_err();
        assert_eq!(e.operation(), Some(MemoryOperation::Write));

        // a word at the very last byte would overflow
        assert!(m.read_word_le(0xffff).is_err());
        assert!(m.write_word_le(0xffff, 0x1234).is_err());
        assert!(m.load(0xfffe, &[1, 2, 3]).is_err());

        // nothing has been touched
        assert_eq!(m, Memory::new());
    }

    #[test]
    fn words_are_little_endian() {
        let mut m = Memory::new();
        m.write_word_le(0x10, 0xabcd).unwrap();
        assert_eq!(m.read_byte(0x10).unwrap(), 0xcd);
        assert_eq!(m.read_byte(0x11).unwrap(), 0xab);
        assert_eq!(m.read_word_le(0x10).unwrap(), 0xabcd);
    }

    #[test]
    fn load_and_clear() {
        let mut m = Memory::new();
        m.load(0x1000, &[0xa9, 0x42, 0x02]).unwrap();
        assert_eq!(&m.as_vec()[0x1000..0x1003], &[0xa9, 0x42, 0x02]);

        m.clear();
        assert!(m.as_vec().iter().all(|b| *b == 0));
    }

    #[test]
    fn equality() {
        let mut m = Memory::new();
        let snapshot = m.clone();
        assert_eq!(m, snapshot);

        m.write_byte(0x8000, 1).unwrap();
        assert_ne!(m, snapshot);
        m.write_byte(0x8000, 0).unwrap();
        assert_eq!(m, snapshot);
    }

    #[test]
    fn dump() {
        let mut m = Memory::new();
        m.load(0x200, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        let s = m.dump(0x200, 32).unwrap();
        assert!(!s.is_empty());
        assert!(m.dump(0xfff0, 0x20).is_err());
    }
}
