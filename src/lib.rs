/*
 * Filename: /src/lib.rs
 * Project: m6502emu
 * Created Date: 2021-08-09, 12:40:12
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

//! a cycle-counted 6502 cpu core.
//!
//! the [cpu::Cpu] owns a [bus::Bus] exposing a flat 64k [memory::Memory], and executes
//! instructions either for a given cycle budget or until the (non standard) HLT opcode is met.
//!
//! ```no_run
//! use m6502emu::cpu::Cpu;
//!
//! let mut c = Cpu::new_default(None);
//! c.reset(Some(0x1000));
//! let mem = c.bus.get_memory();
//! mem.load(0x1000, &[0xa9, 0x42, 0x02]).unwrap();
//! let cycles = c.execute_until_halt().unwrap();
//! assert_eq!(cycles, 2);
//! assert_eq!(c.regs.a, 0x42);
//! ```

pub mod bus;
pub mod cpu;
pub mod memory;
pub(crate) mod utils;
