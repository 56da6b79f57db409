/*
 * Filename: /src/cpu/opcodes.rs
 * Project: m6502emu
 * Created Date: Saturday, July 5rd 2021, 09:33:42 am
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

use crate::cpu::addressing_modes::AddressingModeId::*;
use crate::cpu::addressing_modes::*;
use crate::cpu::cpu_error;
use crate::cpu::cpu_error::CpuError;
use crate::cpu::{Cpu, CpuState, Register};
use crate::utils;
use ::function_name::named;
use lazy_static::*;

/// the (non standard) halt opcode, occupies one of the NMOS JAM slots.
pub const HLT: u8 = 0x02;

/**
 * holds opcode information for logging and opcode_to_string()
 */
#[derive(Clone, Debug, Copy)]
pub(crate) struct OpcodeMarker {
    /// opcode name
    pub(crate) name: &'static str,

    /// addressing mode
    pub(crate) id: AddressingModeId,
}

/**
 * executes an opcode, the opcode byte has already been fetched.
 */
pub(crate) type OpcodeFn = fn(c: &mut Cpu) -> Result<(), CpuError>;

/**
 * an entry in the opcode matrix.
 */
#[derive(Clone, Copy)]
pub(crate) struct Opcode {
    /// addressing mode and register bound together in a non capturing closure.
    pub(crate) exec: OpcodeFn,

    /// documented cycles (opcode fetch included, no page crossing).
    pub(crate) cycles: usize,

    pub(crate) mrk: OpcodeMarker,
}

fn op(exec: OpcodeFn, cycles: usize, name: &'static str, id: AddressingModeId) -> Option<Opcode> {
    Some(Opcode {
        exec: exec,
        cycles: cycles,
        mrk: OpcodeMarker { name: name, id: id },
    })
}

lazy_static! {
    /**
     * the 256 opcodes table, unassigned slots are None.
     *
     * most of the info taken from :
     *
     * - https://www.masswerk.at/6502/6502_instruction_set.html
     * - https://problemkaputt.de/2k6specs.htm#cpu65xxmicroprocessor
     */
    pub(crate) static ref OPCODE_MATRIX: Vec<Option<Opcode>> = {
        let mut m: Vec<Option<Opcode>> = vec![None; 256];

        // lda
        m[0xa9] = op(|c| load::<ImmediateAddressing>(c, Register::A), 2, "lda", Imm);
        m[0xa5] = op(|c| load::<ZeroPageAddressing>(c, Register::A), 3, "lda", Zpg);
        m[0xb5] = op(|c| load::<ZeroPageXAddressing>(c, Register::A), 4, "lda", Zpx);
        m[0xad] = op(|c| load::<AbsoluteAddressing>(c, Register::A), 4, "lda", Abs);
        m[0xbd] = op(|c| load::<AbsoluteXAddressing>(c, Register::A), 4, "lda", Abx);
        m[0xb9] = op(|c| load::<AbsoluteYAddressing>(c, Register::A), 4, "lda", Aby);
        m[0xa1] = op(|c| load::<XIndirectAddressing>(c, Register::A), 6, "lda", Xin);
        m[0xb1] = op(|c| load::<IndirectYAddressing>(c, Register::A), 5, "lda", Iny);

        // ldx
        m[0xa2] = op(|c| load::<ImmediateAddressing>(c, Register::X), 2, "ldx", Imm);
        m[0xa6] = op(|c| load::<ZeroPageAddressing>(c, Register::X), 3, "ldx", Zpg);
        m[0xb6] = op(|c| load::<ZeroPageYAddressing>(c, Register::X), 4, "ldx", Zpy);
        m[0xae] = op(|c| load::<AbsoluteAddressing>(c, Register::X), 4, "ldx", Abs);
        m[0xbe] = op(|c| load::<AbsoluteYAddressing>(c, Register::X), 4, "ldx", Aby);

        // ldy
        m[0xa0] = op(|c| load::<ImmediateAddressing>(c, Register::Y), 2, "ldy", Imm);
        m[0xa4] = op(|c| load::<ZeroPageAddressing>(c, Register::Y), 3, "ldy", Zpg);
        m[0xb4] = op(|c| load::<ZeroPageXAddressing>(c, Register::Y), 4, "ldy", Zpx);
        m[0xac] = op(|c| load::<AbsoluteAddressing>(c, Register::Y), 4, "ldy", Abs);
        m[0xbc] = op(|c| load::<AbsoluteXAddressing>(c, Register::Y), 4, "ldy", Abx);

        // sta
        m[0x85] = op(|c| store::<ZeroPageAddressing>(c, Register::A), 3, "sta", Zpg);
        m[0x95] = op(|c| store::<ZeroPageXAddressing>(c, Register::A), 4, "sta", Zpx);
        m[0x8d] = op(|c| store::<AbsoluteAddressing>(c, Register::A), 4, "sta", Abs);
        m[0x9d] = op(|c| store::<AbsoluteXAddressing>(c, Register::A), 5, "sta", Abx);
        m[0x99] = op(|c| store::<AbsoluteYAddressing>(c, Register::A), 5, "sta", Aby);
        m[0x81] = op(|c| store::<XIndirectAddressing>(c, Register::A), 6, "sta", Xin);
        m[0x91] = op(|c| store::<IndirectYAddressing>(c, Register::A), 6, "sta", Iny);

        // stx
        m[0x86] = op(|c| store::<ZeroPageAddressing>(c, Register::X), 3, "stx", Zpg);
        m[0x96] = op(|c| store::<ZeroPageYAddressing>(c, Register::X), 4, "stx", Zpy);
        m[0x8e] = op(|c| store::<AbsoluteAddressing>(c, Register::X), 4, "stx", Abs);

        // sty
        m[0x84] = op(|c| store::<ZeroPageAddressing>(c, Register::Y), 3, "sty", Zpg);
        m[0x94] = op(|c| store::<ZeroPageXAddressing>(c, Register::Y), 4, "sty", Zpx);
        m[0x8c] = op(|c| store::<AbsoluteAddressing>(c, Register::Y), 4, "sty", Abs);

        // implied
        m[0x9a] = op(txs, 2, "txs", Imp);
        m[0xea] = op(nop, 2, "nop", Imp);
        m[HLT as usize] = op(hlt, 0, "hlt", Imp);
        m
    };
}

/**
 * returns a printable name (mnemonic and addressing mode) for a supported opcode.
 */
pub fn opcode_to_string(opcode: u8) -> Result<String, CpuError> {
    match OPCODE_MATRIX[opcode as usize] {
        Some(opc) => Ok(format!("{} [{}]", opc.mrk.name.to_uppercase(), opc.mrk.id)),
        None => Err(cpu_error::new_invalid_opcode_error(0, opcode)),
    }
}

/**
 * helper to set Z and N flags in one shot, depending on val
 */
fn set_zn_flags(c: &mut Cpu, val: u8) {
    c.regs.p.z = val == 0;
    c.regs.p.n = utils::is_signed(val);
}

/**
 * LDA/LDX/LDY - Load Register
 *
 * R,Z,N = M
 *
 * Loads a byte of memory into the register setting the zero and negative flags as appropriate.
 *
 * C	Carry Flag	Not affected
 * Z	Zero Flag	Set if R = 0
 * I	Interrupt Disable	Not affected
 * D	Decimal Mode Flag	Not affected
 * B	Break Command	Not affected
 * V	Overflow Flag	Not affected
 * N	Negative Flag	Set if bit 7 of R is set
 *
 * addressing	assembler	opc	bytes	cycles
 * immediate	LDA #oper	A9	2	    2
 * zeropage	    LDA oper	A5	2	    3
 * zeropage,X	LDA oper,X	B5	2	    4
 * absolute	    LDA oper	AD	3	    4
 * absolute,X	LDA oper,X	BD	3	    4*
 * absolute,Y	LDA oper,Y	B9	3	    4*
 * (indirect,X)	LDA (oper,X)	A1	2	6
 * (indirect),Y	LDA (oper),Y	B1	2	5*
 *
 * LDX uses zeropage,Y and absolute,Y, LDY uses zeropage,X and absolute,X.
 */
#[named]
fn load<A: AddressingMode>(c: &mut Cpu, reg: Register) -> Result<(), CpuError> {
    let b = A::load(c, false)?;
    *c.regs.get_mut(reg) = b;
    set_zn_flags(c, b);
    utils::debug_out_handler(function_name!(), Some(reg));
    Ok(())
}

/**
 * STA/STX/STY - Store Register
 *
 * M = R
 *
 * Stores the contents of the register into memory, flags are not affected.
 *
 * addressing	assembler	opc	bytes	cycles
 * zeropage	    STA oper	85	2	    3
 * zeropage,X	STA oper,X	95	2	    4
 * absolute	    STA oper	8D	3	    4
 * absolute,X	STA oper,X	9D	3	    5
 * absolute,Y	STA oper,Y	99	3	    5
 * (indirect,X)	STA (oper,X)	81	2	6
 * (indirect),Y	STA (oper),Y	91	2	6
 *
 * indexed writes always pay the page crossing cycle.
 */
#[named]
fn store<A: AddressingMode>(c: &mut Cpu, reg: Register) -> Result<(), CpuError> {
    let b = c.regs.get(reg);
    A::store(c, true, b)?;
    utils::debug_out_handler(function_name!(), Some(reg));
    Ok(())
}

/**
 * TXS - Transfer X to Stack Pointer
 *
 * S = X, flags are not affected.
 *
 * addressing	assembler	opc	bytes	cycles
 * implied	    TXS	        9A	1	    2
 */
#[named]
fn txs(c: &mut Cpu) -> Result<(), CpuError> {
    c.regs.s = c.regs.x;
    c.tick();
    utils::debug_out_handler(function_name!(), Some(Register::X));
    Ok(())
}

/**
 * NOP - No Operation
 *
 * addressing	assembler	opc	bytes	cycles
 * implied	    NOP	        EA	1	    2
 */
#[named]
fn nop(c: &mut Cpu) -> Result<(), CpuError> {
    c.tick();
    utils::debug_out_handler(function_name!(), None);
    Ok(())
}

/**
 * HLT - stops execute() and execute_until_halt().
 *
 * the opcode fetch cycle is given back, so halting takes no cycles.
 */
#[named]
fn hlt(c: &mut Cpu) -> Result<(), CpuError> {
    c.cycles = c.cycles.wrapping_sub(1);
    c.state = CpuState::Halted;
    utils::debug_out_handler(function_name!(), None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(opcode_to_string(0xa9).unwrap(), "LDA [Imm]");
        assert_eq!(opcode_to_string(0xbe).unwrap(), "LDX [AbY]");
        assert_eq!(opcode_to_string(0x91).unwrap(), "STA [InY]");
        assert_eq!(opcode_to_string(0x9a).unwrap(), "TXS [Imp]");
        assert_eq!(opcode_to_string(HLT).unwrap(), "HLT [Imp]");

        let e = opcode_to_string(0xff).unwrap_err();
        assert_eq!(e.t, cpu_error::ErrorType::InvalidOpcode);
        assert_eq!(e.opcode(), 0xff);
    }

    #[test]
    fn matrix() {
        assert_eq!(OPCODE_MATRIX.len(), 256);
        assert_eq!(OPCODE_MATRIX.iter().filter(|o| o.is_some()).count(), 34);

        // 0x00 (brk) is not implemented
        assert!(OPCODE_MATRIX[0].is_none());
    }

    #[test]
    fn base_cycles_match_measured() {
        // with zeroed indexes and operands, nothing crosses a page: every opcode must cost what the table says
        for (i, o) in OPCODE_MATRIX.iter().enumerate() {
            let opc = match o {
                Some(opc) => *opc,
                None => continue,
            };
            let mut c = Cpu::new_default(None);
            c.reset(Some(0x1000));
            c.bus.get_memory().write_byte(0x1000, i as u8).unwrap();

            let elapsed = c.execute_one().unwrap();
            assert_eq!(elapsed, opc.cycles, "opcode ${:02x} ({})", i, opc.mrk.name);
            assert_eq!(
                c.regs.pc,
                0x1000 + opc.mrk.id.len(),
                "opcode ${:02x} ({})",
                i,
                opc.mrk.name
            );
        }
    }
}
