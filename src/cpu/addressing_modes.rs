/*
 * Filename: /src/cpu/addressing_modes.rs
 * Project: m6502emu
 * Created Date: Saturday, July 5rd 2021, 10:02:52 am
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

use crate::cpu::cpu_error::CpuError;
use crate::cpu::Cpu;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

/**
 * this is used to tag elements in the opcode matrix
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum AddressingModeId {
    Abs,
    Abx,
    Aby,
    Imm,
    Imp,
    Xin,
    Iny,
    Zpg,
    Zpx,
    Zpy,
}

impl AddressingModeId {
    /**
     * the instruction size (opcode included).
     */
    pub(crate) fn len(&self) -> u16 {
        match self {
            AddressingModeId::Imp => 1,
            AddressingModeId::Abs | AddressingModeId::Abx | AddressingModeId::Aby => 3,
            _ => 2,
        }
    }
}

impl Display for AddressingModeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let s = match self {
            AddressingModeId::Abs => "Abs",
            AddressingModeId::Abx => "AbX",
            AddressingModeId::Aby => "AbY",
            AddressingModeId::Imm => "Imm",
            AddressingModeId::Imp => "Imp",
            AddressingModeId::Xin => "Xin",
            AddressingModeId::Iny => "InY",
            AddressingModeId::Zpg => "Zpg",
            AddressingModeId::Zpx => "ZpX",
            AddressingModeId::Zpy => "ZpY",
        };
        write!(f, "{}", s)
    }
}

/**
 * http://www.emulator101.com/6502-addressing-modes.html
 * https://www.masswerk.at/6502/6502_instruction_set.html
 *
 * every mode consumes its operand bytes from the instruction stream (moving PC) and charges the cycles the real
 * hardware spends computing the address. the opcode fetch itself (1 cycle) is charged by the cpu loop.
 */
pub(crate) trait AddressingMode {
    /**
     * fetch the operand and compute the effective address.
     *
     * always_extra_cycle is used by write-class instructions, which pay the page crossing cycle unconditionally.
     */
    fn target_address(c: &mut Cpu, always_extra_cycle: bool) -> Result<u16, CpuError>;

    /**
     * load the operand value.
     */
    fn load(c: &mut Cpu, always_extra_cycle: bool) -> Result<u8, CpuError> {
        let address = Self::target_address(c, always_extra_cycle)?;
        c.read_byte(address)
    }

    /**
     * store byte to the effective address.
     */
    fn store(c: &mut Cpu, always_extra_cycle: bool, b: u8) -> Result<(), CpuError> {
        let address = Self::target_address(c, always_extra_cycle)?;
        c.write_byte(address, b)
    }
}

/**
 * check hi-byte of source and destination addresses, to determine if there's a page cross.
 */
pub(crate) fn is_page_cross(src_addr: u16, dst_addr: u16) -> bool {
    src_addr & 0xff00 != dst_addr & 0xff00
}

/**
 * add an index to a base address, charging the extra cycle on page crossing (or always, if requested).
 */
fn add_index(c: &mut Cpu, base: u16, index: u8, always_extra_cycle: bool) -> u16 {
    let address = base.wrapping_add(index as u16);
    if always_extra_cycle || is_page_cross(base, address) {
        c.tick();
    }
    address
}

/**
 * reads a pointer from the zeropage, the msb wraps to $00 if the pointer is at $ff.
 */
fn read_zeropage_pointer(c: &mut Cpu, zp: u8) -> Result<u16, CpuError> {
    let lo = c.read_byte(zp as u16)?;
    let hi = c.read_byte(zp.wrapping_add(1) as u16)?;
    Ok(((hi as u16) << 8) | (lo as u16))
}

/**
 * These instructions have their data defined as the next byte after the opcode. LDA #$B2 will load $B2 into the accumulator.
 */
pub(crate) struct ImmediateAddressing;
impl AddressingMode for ImmediateAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        // the operand is the byte at PC, skip it
        let address = c.regs.pc;
        c.regs.pc = c.regs.pc.wrapping_add(1);
        c.tick();
        Ok(address)
    }

    fn load(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u8, CpuError> {
        c.fetch_byte()
    }
}

/**
 * Absolute addressing specifies the memory location explicitly in the two bytes following the opcode.
 * The 6502 is a little endian machine, so any 16 bit (2 byte) value is stored with the LSB first. All instructions that use absolute addressing are 3 bytes.
 */
pub(crate) struct AbsoluteAddressing;
impl AddressingMode for AbsoluteAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        c.fetch_word()
    }
}

/**
 * This addressing mode makes the target address by adding the contents of the X register to an absolute address.
 * Crossing a page costs one more cycle.
 */
pub(crate) struct AbsoluteXAddressing;
impl AddressingMode for AbsoluteXAddressing {
    fn target_address(c: &mut Cpu, always_extra_cycle: bool) -> Result<u16, CpuError> {
        let w = c.fetch_word()?;
        let x = c.regs.x;
        Ok(add_index(c, w, x, always_extra_cycle))
    }
}

/**
 * This addressing mode makes the target address by adding the contents of the Y register to an absolute address.
 * Crossing a page costs one more cycle.
 */
pub(crate) struct AbsoluteYAddressing;
impl AddressingMode for AbsoluteYAddressing {
    fn target_address(c: &mut Cpu, always_extra_cycle: bool) -> Result<u16, CpuError> {
        let w = c.fetch_word()?;
        let y = c.regs.y;
        Ok(add_index(c, w, y, always_extra_cycle))
    }
}

/**
 * This mode is only used with the X register.
 * Consider a situation where the instruction is LDA ($20,X), X contains $04, and memory at $24 contains 0024: 74 20, First, X is added to $20 to get $24.
 * The target address will be fetched from $24 resulting in a target address of $2074. Register A will be loaded with the contents of memory at $2074.
 *
 * If X + the immediate byte will wrap around to a zero-page address. So you could code that like targetAddress = (X + opcode[1]) & 0xFF .
 */
pub(crate) struct XIndirectAddressing;
impl AddressingMode for XIndirectAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        // read address in zeropage
        let zp = c.fetch_byte()?;

        // add x (wrapping), this costs a cycle
        let zp = zp.wrapping_add(c.regs.x);
        c.tick();

        read_zeropage_pointer(c, zp)
    }
}

/**
 * This mode is only used with the Y register. It differs in the order that Y is applied to the indirectly fetched address.
 *
 * An example instruction that uses indirect index addressing is LDA ($86),Y . To calculate the target address, the CPU will first fetch the address stored at zero page location $86.
 * That address will be added to register Y to get the final target address. For LDA ($86),Y, if the address stored at $86 is $4028 (memory is 0086: 28 40, remember little endian) and
 * register Y contains $10, then the final target address would be $4038.
 *
 * While indexed indirect addressing will only generate a zero-page address, this mode's target address is not wrapped - it can be anywhere in the 16-bit address space.
 */
pub(crate) struct IndirectYAddressing;
impl AddressingMode for IndirectYAddressing {
    fn target_address(c: &mut Cpu, always_extra_cycle: bool) -> Result<u16, CpuError> {
        // read address contained at address in the zeropage
        let zp = c.fetch_byte()?;
        let w = read_zeropage_pointer(c, zp)?;

        // add y
        let y = c.regs.y;
        Ok(add_index(c, w, y, always_extra_cycle))
    }
}

/**
 * Zero-Page is an addressing mode that is only capable of addressing the first 256 bytes of the CPU's memory map. You can think of it as absolute addressing for the first 256 bytes.
 * The instruction LDA $35 will put the value stored in memory location $35 into A.
 */
pub(crate) struct ZeroPageAddressing;
impl AddressingMode for ZeroPageAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        let zp = c.fetch_byte()?;
        Ok(zp as u16)
    }
}

/**
 * This works just like absolute indexed, but the target address is limited to the first 0xFF bytes.
 * The target address will wrap around and will always be in the zero page. If the instruction is LDA $C0,X, and X is $60, then the target address will be $20.
 * $C0+$60 = $120, but the carry is discarded in the calculation of the target address.
 */
pub(crate) struct ZeroPageXAddressing;
impl AddressingMode for ZeroPageXAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        let zp = c.fetch_byte()?;

        // add x, wrapping
        c.tick();
        Ok(zp.wrapping_add(c.regs.x) as u16)
    }
}

/**
 * Same as ZeroPageXAddressing, using Y (LDX and STX only).
 */
pub(crate) struct ZeroPageYAddressing;
impl AddressingMode for ZeroPageYAddressing {
    fn target_address(c: &mut Cpu, _always_extra_cycle: bool) -> Result<u16, CpuError> {
        let zp = c.fetch_byte()?;

        // add y, wrapping
        c.tick();
        Ok(zp.wrapping_add(c.regs.y) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(program: &[u8]) -> Cpu {
        let mut c = Cpu::new_default(None);
        c.reset(Some(0x1000));
        c.bus.get_memory().load(0x1000, program).unwrap();
        c
    }

    #[test]
    fn page_cross() {
        assert!(!is_page_cross(0x1000, 0x10ff));
        assert!(is_page_cross(0x10ff, 0x1100));
        assert!(is_page_cross(0xabcd, 0xaccc));
        assert!(is_page_cross(0xffff, 0x0000));
    }

    #[test]
    fn immediate() {
        let mut c = setup(&[0x42]);
        assert_eq!(ImmediateAddressing::load(&mut c, false).unwrap(), 0x42);
        assert_eq!(c.regs.pc, 0x1001);
        assert_eq!(c.cycles, 1);
    }

    #[test]
    fn zeropage() {
        let mut c = setup(&[0x37]);
        c.bus.get_memory().write_byte(0x37, 0x99).unwrap();
        assert_eq!(ZeroPageAddressing::load(&mut c, false).unwrap(), 0x99);
        assert_eq!(c.regs.pc, 0x1001);
        assert_eq!(c.cycles, 2);
    }

    #[test]
    fn zeropage_indexed_wraps() {
        let mut c = setup(&[0xff]);
        c.regs.x = 0x02;
        assert_eq!(ZeroPageXAddressing::target_address(&mut c, false).unwrap(), 0x0001);
        assert_eq!(c.cycles, 2);

        let mut c = setup(&[0xc0]);
        c.regs.y = 0x60;
        assert_eq!(ZeroPageYAddressing::target_address(&mut c, false).unwrap(), 0x0020);
        assert_eq!(c.cycles, 2);
    }

    #[test]
    fn absolute() {
        let mut c = setup(&[0xcd, 0xab]);
        assert_eq!(AbsoluteAddressing::target_address(&mut c, false).unwrap(), 0xabcd);
        assert_eq!(c.regs.pc, 0x1002);
        assert_eq!(c.cycles, 2);
    }

    #[test]
    fn absolute_indexed() {
        // no page crossing
        let mut c = setup(&[0x00, 0x20]);
        c.regs.x = 0x10;
        assert_eq!(AbsoluteXAddressing::target_address(&mut c, false).unwrap(), 0x2010);
        assert_eq!(c.cycles, 2);

        // page crossing
        let mut c = setup(&[0xcd, 0xab]);
        c.regs.y = 0xff;
        assert_eq!(AbsoluteYAddressing::target_address(&mut c, false).unwrap(), 0xaccc);
        assert_eq!(c.cycles, 3);

        // writes always pay
        let mut c = setup(&[0x00, 0x20]);
        assert_eq!(AbsoluteXAddressing::target_address(&mut c, true).unwrap(), 0x2000);
        assert_eq!(c.cycles, 3);
    }

    #[test]
    fn x_indirect() {
        let mut c = setup(&[0x20]);
        c.regs.x = 0x04;
        c.bus.get_memory().write_word_le(0x24, 0x2074).unwrap();
        assert_eq!(XIndirectAddressing::target_address(&mut c, false).unwrap(), 0x2074);
        assert_eq!(c.regs.pc, 0x1001);
        assert_eq!(c.cycles, 4);
    }

    #[test]
    fn x_indirect_pointer_wraps() {
        // $ff + 1 = $00, pointer lsb at $00, msb at $01
        let mut c = setup(&[0xff]);
        c.regs.x = 0x01;
        c.bus.get_memory().write_word_le(0x00, 0x3456).unwrap();
        assert_eq!(XIndirectAddressing::target_address(&mut c, false).unwrap(), 0x3456);

        // pointer at $ff, msb is read from $00 rather than $100
        let mut c = setup(&[0xff]);
        c.bus.get_memory().write_byte(0xff, 0x78).unwrap();
        c.bus.get_memory().write_byte(0x00, 0x56).unwrap();
        c.bus.get_memory().write_byte(0x100, 0x99).unwrap();
        assert_eq!(XIndirectAddressing::target_address(&mut c, false).unwrap(), 0x5678);
    }

    #[test]
    fn indirect_y() {
        let mut c = setup(&[0x86]);
        c.regs.y = 0x10;
        c.bus.get_memory().write_word_le(0x86, 0x4028).unwrap();
        assert_eq!(IndirectYAddressing::target_address(&mut c, false).unwrap(), 0x4038);
        assert_eq!(c.cycles, 3);

        // crossing
        let mut c = setup(&[0x86]);
        c.regs.y = 0xff;
        c.bus.get_memory().write_word_le(0x86, 0xabcd).unwrap();
        assert_eq!(IndirectYAddressing::target_address(&mut c, false).unwrap(), 0xaccc);
        assert_eq!(c.cycles, 4);

        // always
        let mut c = setup(&[0x86]);
        c.bus.get_memory().write_word_le(0x86, 0x4028).unwrap();
        assert_eq!(IndirectYAddressing::target_address(&mut c, true).unwrap(), 0x4028);
        assert_eq!(c.cycles, 4);
    }

    #[test]
    fn store() {
        let mut c = setup(&[0x00, 0x30]);
        AbsoluteAddressing::store(&mut c, false, 0x5a).unwrap();
        assert_eq!(c.bus.get_memory().read_byte(0x3000).unwrap(), 0x5a);
        assert_eq!(c.cycles, 3);
    }

    #[test]
    fn mode_lengths() {
        assert_eq!(AddressingModeId::Imp.len(), 1);
        assert_eq!(AddressingModeId::Imm.len(), 2);
        assert_eq!(AddressingModeId::Iny.len(), 2);
        assert_eq!(AddressingModeId::Aby.len(), 3);
    }
}
