/*
 * Filename: /src/utils.rs
 * Project: m6502emu
 * Created Date: 2021-08-09, 13:02:31
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

use crate::cpu::opcodes::Opcode;
use crate::cpu::{Cpu, CpuCallbackContext, CpuObserver, Register};
use log::*;
use std::fmt::Display;

/**
 * simply check bit 7 for signed/unsigned byte
 */
pub(crate) fn is_signed(n: u8) -> bool {
    (n & 0x80) != 0
}

/**
 * display the decoded opcode with its bytes, at trace level
 */
pub(crate) fn debug_out_opcode(c: &mut Cpu, address: u16, opc: &Opcode) {
    if log_enabled!(Level::Trace) {
        let mem = c.bus.get_memory();
        let mut bytes = String::new();
        for i in 0..opc.mrk.id.len() {
            let b = mem
                .read_byte(address.wrapping_add(i) as usize)
                .unwrap_or_default();
            bytes.push_str(&format!("{:02x} ", b));
        }
        trace!(
            "${:04x}:\t{}\t-->\t{} [{}, {} cycles]",
            address,
            bytes.trim_end(),
            opc.mrk.name.to_uppercase(),
            opc.mrk.id,
            opc.cycles
        );
    }
}

/**
 * display the handler executing an opcode, at trace level
 */
pub(crate) fn debug_out_handler(handler: &str, reg: Option<Register>) {
    match reg {
        Some(r) => trace!("\t{}({:?})", handler, r),
        None => trace!("\t{}", handler),
    }
}

/**
 * display text, at debug level
 */
pub(crate) fn debug_out_text(d: &dyn Display) {
    debug!("{}", d);
}

/**
 * display registers and cycles, at debug level
 */
pub(crate) fn debug_out_registers(c: &Cpu) {
    debug!("\t{}, cycles={}, state={:?}", c.regs, c.cycles, c.state);
}

/**
 * a CpuObserver which sends every notification to the log (trace level).
 *
 * use together with Cpu::enable_logging().
 */
#[derive(Debug, Default)]
pub struct LogObserver;

impl CpuObserver for LogObserver {
    fn notify(&mut self, ctx: &CpuCallbackContext) {
        trace!("{}", ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed() {
        assert!(!is_signed(0x00));
        assert!(!is_signed(0x7f));
        assert!(is_signed(0x80));
        assert!(is_signed(0xff));
    }
}
