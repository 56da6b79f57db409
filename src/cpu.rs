/*
 * Filename: /src/cpu.rs
 * Project: m6502emu
 * Created Date: 2021-08-09, 12:51:43
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

use crate::bus::Bus;
use crate::memory::Memory;
use crate::utils;
use std::fmt::{Display, Error, Formatter};

use bitflags::bitflags;
pub(crate) mod addressing_modes;
pub mod cpu_error;
pub(crate) mod opcodes;
use cpu_error::CpuError;

pub use crate::utils::LogObserver;
pub use opcodes::{opcode_to_string, HLT};

/**
 * address of the 6502 reset vector, used as start address when reset() is not given one.
 */
pub const RESET_VECTOR: u16 = 0xfffc;

/**
 * top of the stack (the stack lives in page 1, $0100-$01ff).
 */
pub const STACK_TOP: u8 = 0xff;

bitflags! {
    /**
     * flags (bit layout of the P register).
     * https://www.atarimagazines.com/compute/issue53/047_1_All_About_The_Status_Register.php
     */
    pub struct CpuFlags : u8 {
        /**
         * C (bit 0): Carry flag. Carry is set whenever the accumulator rolls over from $FF to $00.
         */
        const C = 0b00000001;
        /**
         * Z (bit 1): Zero flag. Set when the result of an operation (or a loaded value) is zero.
         */
        const Z = 0b00000010;
        /**
         * I (bit 2): Interrupt mask. When this bit is set, the computer will not honor interrupts.
         */
        const I = 0b00000100;
        /**
         * D (bit 3): Decimal flag. When D is set the 6502 does its arithmetic in BCD.
         */
        const D = 0b00001000;
        /**
         * B (bit 4): Break flag, set whenever a BRK instruction is executed.
         */
        const B = 0b00010000;
        /**
         * Bit 5 has no name.
         */
        const U = 0b00100000;
        /**
         * V (bit 6): Overflow flag.
         */
        const V = 0b01000000;
        /**
         * N (bit 7): Negative flag. Matches the high bit of the result of whatever operation the processor has just completed.
         * If you load $FF into the Y-register, for example, since the high bit of the Y-register is set, the N flag will be set, too.
         */
        const N = 0b10000000;
    }
}

/**
 * the P register, one boolean per flag.
 *
 * bits() and from_bits() convert from/to the packed byte (bit 0 = C ... bit 7 = N).
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusRegister {
    pub c: bool,
    pub z: bool,
    pub i: bool,
    pub d: bool,
    pub b: bool,
    pub u: bool,
    pub v: bool,
    pub n: bool,
}

impl StatusRegister {
    /**
     * pack the flags into a byte.
     */
    pub fn bits(&self) -> u8 {
        let mut p = CpuFlags::empty();
        p.set(CpuFlags::C, self.c);
        p.set(CpuFlags::Z, self.z);
        p.set(CpuFlags::I, self.i);
        p.set(CpuFlags::D, self.d);
        p.set(CpuFlags::B, self.b);
        p.set(CpuFlags::U, self.u);
        p.set(CpuFlags::V, self.v);
        p.set(CpuFlags::N, self.n);
        p.bits()
    }

    /**
     * unpack a byte into the flags.
     */
    pub fn from_bits(b: u8) -> StatusRegister {
        // all the 8 bits are defined, nothing to truncate
        let p = CpuFlags::from_bits_truncate(b);
        StatusRegister {
            c: p.contains(CpuFlags::C),
            z: p.contains(CpuFlags::Z),
            i: p.contains(CpuFlags::I),
            d: p.contains(CpuFlags::D),
            b: p.contains(CpuFlags::B),
            u: p.contains(CpuFlags::U),
            v: p.contains(CpuFlags::V),
            n: p.contains(CpuFlags::N),
        }
    }
}

/**
 * the cpu registers.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: StatusRegister,
    pub s: u8,
    pub pc: u16,
}

/**
 * selects one of the 8 bit registers, used by the opcode table to bind an addressing mode to its destination (or source) register.
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum Register {
    A,
    X,
    Y,
}

impl Display for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "PC: ${:04x}, A: ${:02x}, X: ${:02x}, Y: ${:02x}, S: ${:02x}, P: {:02x}({})",
            self.pc,
            self.a,
            self.x,
            self.y,
            self.s,
            self.p.bits(),
            self.flags_to_string(),
        )
    }
}

impl Registers {
    pub fn new() -> Registers {
        Registers::default()
    }

    /**
     * convert P (flags) register to a meaningful string
     */
    fn flags_to_string(&self) -> String {
        let p = &self.p;
        format!(
            "{}{}{}{}{}{}{}{}",
            if p.n { "N" } else { "-" },
            if p.v { "V" } else { "-" },
            if p.u { "U" } else { "-" },
            if p.b { "B" } else { "-" },
            if p.d { "D" } else { "-" },
            if p.i { "I" } else { "-" },
            if p.z { "Z" } else { "-" },
            if p.c { "C" } else { "-" },
        )
    }

    pub(crate) fn get(&self, r: Register) -> u8 {
        match r {
            Register::A => self.a,
            Register::X => self.x,
            Register::Y => self.y,
        }
    }

    pub(crate) fn get_mut(&mut self, r: Register) -> &mut u8 {
        match r {
            Register::A => &mut self.a,
            Register::X => &mut self.x,
            Register::Y => &mut self.y,
        }
    }
}

/**
 * indicates the operation CpuCallbackContext refers to.
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CpuOperation {
    /// a byte has been fetched from the instruction stream.
    Fetch,
    /// a byte has been read from a computed address.
    Read,
    /// a byte has been written.
    Write,
    /// an opcode has been decoded and is about to execute (value is the opcode).
    Exec,
}

/**
 * passed to the installed CpuObserver on every bus access and on every decoded instruction.
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CpuCallbackContext {
    pub address: u16,
    pub value: u8,
    pub operation: CpuOperation,
}

impl Display for CpuCallbackContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.operation {
            CpuOperation::Exec => write!(
                f,
                "CALLBACK! type={:?}, address=${:04x}, opcode=${:02x} ({})",
                self.operation,
                self.address,
                self.value,
                opcode_to_string(self.value).unwrap_or_default()
            ),
            _ => write!(
                f,
                "CALLBACK! type={:?}, address=${:04x}, value=${:02x}",
                self.operation, self.address, self.value
            ),
        }
    }
}

/**
 * optional observer installed into the cpu, notified of fetches, reads, writes and decoded instructions.
 *
 * it is a side channel only: it can't affect registers, memory or cycles.
 */
pub trait CpuObserver {
    fn notify(&mut self, ctx: &CpuCallbackContext);
}

/**
 * state of the fetch/decode/execute loop.
 */
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CpuState {
    Fetching,
    Decoding,
    Executing,
    Halted,
    Faulted,
}

/**
 * implements the cpu.
 */
pub struct Cpu {
    /// cpu registers.
    pub regs: Registers,

    /// total elapsed cycles.
    pub cycles: usize,

    /// where the fetch/decode/execute loop is.
    pub state: CpuState,

    /// the bus.
    pub bus: Box<dyn Bus>,

    /// observer for the user (optional).
    observer: Option<Box<dyn CpuObserver>>,
}

impl PartialEq for Cpu {
    fn eq(&self, other: &Self) -> bool {
        self.regs == other.regs
    }
}

impl Cpu {
    /**
     * activate logging on stdout through env_logger (max level).
     */
    pub fn enable_logging(&self, enable: bool) {
        if enable {
            let _ = env_logger::builder()
                .filter_level(log::LevelFilter::max())
                .try_init();
            log::set_max_level(log::LevelFilter::max());
        } else {
            let _ = env_logger::builder()
                .filter_level(log::LevelFilter::Off)
                .try_init();
            log::set_max_level(log::LevelFilter::Off);
        }
    }

    /**
     * creates a new cpu instance, with the given Bus attached.
     *
     * the provided observer, if any, will be notified *after* each fetch, read and write, and after an opcode has been decoded.
     */
    pub fn new(b: Box<dyn Bus>, observer: Option<Box<dyn CpuObserver>>) -> Cpu {
        Cpu {
            regs: Registers::new(),
            cycles: 0,
            state: CpuState::Fetching,
            bus: b,
            observer: observer,
        }
    }

    /**
     * creates a new cpu instance, with the default Bus attached, exposing a 64k Memory.
     */
    pub fn new_default(observer: Option<Box<dyn CpuObserver>>) -> Cpu {
        let b = crate::bus::new_default(Memory::new());
        Cpu::new(b, observer)
    }

    /**
     * install (or remove, passing None) the observer.
     */
    pub fn set_observer(&mut self, observer: Option<Box<dyn CpuObserver>>) {
        self.observer = observer;
    }

    /**
     * call installed observer if any.
     */
    pub(crate) fn call_callback(&mut self, address: u16, value: u8, op: CpuOperation) {
        if let Some(o) = self.observer.as_mut() {
            let ctx = CpuCallbackContext {
                address: address,
                value: value,
                operation: op,
            };
            o.notify(&ctx);
        }
    }

    /**
     * resets the cpu and clears memory.
     *
     * PC is set to start_address, or to the RESET vector address ($fffc) if None is given.
     * the vector content is not read since memory has just been cleared.
     */
    pub fn reset(&mut self, start_address: Option<u16>) {
        self.bus.get_memory().clear();

        self.regs = Registers {
            a: 0,
            x: 0,
            y: 0,
            p: StatusRegister::default(),
            s: STACK_TOP,
            pc: start_address.unwrap_or(RESET_VECTOR),
        };
        self.state = CpuState::Fetching;
        utils::debug_out_text(&format!("cpu reset, {}", self.regs));
    }

    /**
     * consume one cycle without accessing the bus.
     */
    pub(crate) fn tick(&mut self) {
        self.cycles = self.cycles.wrapping_add(1);
    }

    /**
     * fetch byte at PC and increment PC (1 cycle).
     */
    pub fn fetch_byte(&mut self) -> Result<u8, CpuError> {
        let pc = self.regs.pc;
        let b = self.bus.get_memory().read_byte(pc as usize)?;
        self.regs.pc = pc.wrapping_add(1);
        self.tick();
        self.call_callback(pc, b, CpuOperation::Fetch);
        Ok(b)
    }

    /**
     * fetch a little-endian word at PC and increment PC by 2 (2 cycles).
     */
    pub fn fetch_word(&mut self) -> Result<u16, CpuError> {
        let lo = self.fetch_byte()?;
        let hi = self.fetch_byte()?;
        Ok(((hi as u16) << 8) | (lo as u16))
    }

    /**
     * read byte at address, PC is not touched (1 cycle).
     */
    pub fn read_byte(&mut self, address: u16) -> Result<u8, CpuError> {
        let b = self.bus.get_memory().read_byte(address as usize)?;
        self.tick();
        self.call_callback(address, b, CpuOperation::Read);
        Ok(b)
    }

    /**
     * read a little-endian word at address (2 cycles).
     */
    pub fn read_word(&mut self, address: u16) -> Result<u16, CpuError> {
        let lo = self.read_byte(address)?;
        let hi = self.read_byte(address.wrapping_add(1))?;
        Ok(((hi as u16) << 8) | (lo as u16))
    }

    /**
     * write byte at address (1 cycle).
     */
    pub fn write_byte(&mut self, address: u16, b: u8) -> Result<(), CpuError> {
        self.bus.get_memory().write_byte(address as usize, b)?;
        self.tick();
        self.call_callback(address, b, CpuOperation::Write);
        Ok(())
    }

    /**
     * fetch, decode and execute a single instruction, returns the elapsed cycles.
     *
     * a halted or faulted cpu restarts fetching from the current PC.
     */
    pub fn execute_one(&mut self) -> Result<usize, CpuError> {
        let start = self.cycles;
        let pc = self.regs.pc;

        // fetch
        self.state = CpuState::Fetching;
        let b = self.fetch_byte()?;

        // decode
        self.state = CpuState::Decoding;
        let opc = match opcodes::OPCODE_MATRIX[b as usize] {
            Some(opc) => opc,
            None => {
                self.state = CpuState::Faulted;
                let e = cpu_error::new_invalid_opcode_error(pc as usize, b);
                utils::debug_out_text(&e);
                return Err(e);
            }
        };
        self.call_callback(pc, b, CpuOperation::Exec);
        utils::debug_out_opcode(self, pc, &opc);

        // execute
        self.state = CpuState::Executing;
        (opc.exec)(self)?;
        if self.state == CpuState::Executing {
            self.state = CpuState::Fetching;
        }
        utils::debug_out_registers(self);
        Ok(self.cycles.wrapping_sub(start))
    }

    /**
     * run the cpu for (at least) the given cycles, returns the elapsed cycles.
     *
     * an instruction, once started, always completes: the returned value may exceed the budget by
     * the cost of the last instruction. stops early if the HLT opcode is met.
     *
     * > note that reset() must be called first to set the start address !
     */
    pub fn execute(&mut self, cycles: usize) -> Result<usize, CpuError> {
        let mut elapsed: usize = 0;
        while elapsed < cycles {
            elapsed += self.execute_one()?;
            if self.state == CpuState::Halted {
                break;
            }
        }
        Ok(elapsed)
    }

    /**
     * run the cpu until the HLT opcode is met, returns the elapsed cycles.
     *
     * > the program must contain HLT, or this never returns (unless an invalid opcode is hit).
     */
    pub fn execute_until_halt(&mut self) -> Result<usize, CpuError> {
        let mut elapsed: usize = 0;
        loop {
            elapsed += self.execute_one()?;
            if self.state == CpuState::Halted {
                return Ok(elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Cpu {
        let mut c = Cpu::new_default(None);
        c.reset(Some(0x1000));
        c
    }

    #[test]
    fn status_register_packing() {
        for b in 0..=255u8 {
            let p = StatusRegister::from_bits(b);
            assert_eq!(p.bits(), b);
            assert_eq!(p.c, b & 0x01 != 0);
            assert_eq!(p.z, b & 0x02 != 0);
            assert_eq!(p.i, b & 0x04 != 0);
            assert_eq!(p.d, b & 0x08 != 0);
            assert_eq!(p.b, b & 0x10 != 0);
            assert_eq!(p.u, b & 0x20 != 0);
            assert_eq!(p.v, b & 0x40 != 0);
            assert_eq!(p.n, b & 0x80 != 0);
        }

        let mut p = StatusRegister::default();
        p.n = true;
        p.c = true;
        assert_eq!(p.bits(), 0b1000_0001);
    }

    #[test]
    fn registers_display() {
        let mut r = Registers::new();
        r.pc = 0x1234;
        r.a = 0x42;
        r.p.z = true;
        r.p.n = true;
        assert_eq!(
            r.to_string(),
            "PC: $1234, A: $42, X: $00, Y: $00, S: $00, P: 82(N-----Z-)"
        );
    }

    #[test]
    fn fetch_advances_pc() {
        let mut c = setup();
        c.bus.get_memory().load(0x1000, &[0x11, 0x22, 0x33]).unwrap();

        assert_eq!(c.fetch_byte().unwrap(), 0x11);
        assert_eq!(c.regs.pc, 0x1001);
        assert_eq!(c.cycles, 1);

        assert_eq!(c.fetch_word().unwrap(), 0x3322);
        assert_eq!(c.regs.pc, 0x1003);
        assert_eq!(c.cycles, 3);
    }

    #[test]
    fn fetch_wraps_pc() {
        let mut c = Cpu::new_default(None);
        c.reset(Some(0xffff));
        c.bus.get_memory().write_byte(0xffff, 0x34).unwrap();
        c.bus.get_memory().write_byte(0, 0x12).unwrap();

        assert_eq!(c.fetch_word().unwrap(), 0x1234);
        assert_eq!(c.regs.pc, 0x0001);
    }

    #[test]
    fn read_leaves_pc() {
        let mut c = setup();
        c.bus.get_memory().write_word_le(0x2000, 0xbeef).unwrap();

        assert_eq!(c.read_byte(0x2000).unwrap(), 0xef);
        assert_eq!(c.cycles, 1);
        assert_eq!(c.read_word(0x2000).unwrap(), 0xbeef);
        assert_eq!(c.cycles, 3);
        assert_eq!(c.regs.pc, 0x1000);
    }

    #[test]
    fn write_costs_one_cycle() {
        let mut c = setup();
        c.write_byte(0x3000, 0x99).unwrap();
        assert_eq!(c.cycles, 1);
        assert_eq!(c.bus.get_memory().read_byte(0x3000).unwrap(), 0x99);
    }

    #[test]
    fn reset_without_address_uses_vector() {
        let mut c = Cpu::new_default(None);
        c.reset(None);
        assert_eq!(c.regs.pc, RESET_VECTOR);
        assert_eq!(c.regs.s, STACK_TOP);
        assert_eq!(c.state, CpuState::Fetching);
    }

    #[test]
    fn cpu_equality() {
        let c = setup();
        let mut other = setup();
        assert!(c == other);

        other.regs.p.v = true;
        assert!(c != other);

        // memory and cycles are not part of the comparison
        other.regs.p.v = false;
        other.cycles = 100;
        other.bus.get_memory().write_byte(0, 1).unwrap();
        assert!(c == other);
    }
}
