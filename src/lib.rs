pub mod cpu;
pub mod error;
pub mod instruction;
pub mod memory_bus;
pub mod memory_map;
pub mod ppu;

use cpu::Cpu;
use error::CoreError;
use memory_bus::MemoryBus;
use ppu::Ppu;

/// Ties the CPU, MMU and PPU together behind one handle, as described by the
/// host API: construct once per session, then drive it with `cpu_step` and
/// `ppu_step` from the caller's own loop.
pub struct State {
    pub cpu: Cpu,
    pub memory_bus: MemoryBus,
    pub ppu: Ppu,
}

impl State {
    /// Builds a fresh session from a ROM image. Skips the boot ROM: `ime` is
    /// set, registers take their post-boot values, and RAM starts zeroed.
    pub fn new(rom: Vec<u8>) -> Self {
        let mut memory_bus = MemoryBus::new(rom);
        let mut cpu = Cpu::new(true);
        cpu.ime = true;
        Cpu::initialize_post_boot_io(&mut memory_bus);
        State {
            cpu,
            memory_bus,
            ppu: Ppu::new(),
        }
    }

    /// Advances the CPU by exactly one instruction (or one interrupt
    /// dispatch, or one HALT-stalled cycle). Returns the number of clock
    /// cycles consumed, always a positive multiple of 4.
    pub fn cpu_step(&mut self) -> Result<u16, CoreError> {
        self.cpu.step(&mut self.memory_bus)
    }

    /// Advances the PPU by one machine cycle, invoking `vblank_cb` when `LY`
    /// transitions to 144. Callers drive this once per clock cycle the CPU
    /// just consumed: `for _ in 0..cycles { state.ppu_step(&mut cb) }`.
    pub fn ppu_step(&mut self, vblank_cb: impl FnMut(&[u32])) {
        self.ppu.step(&mut self.memory_bus, vblank_cb);
    }

    /// Total clock cycles elapsed since session start.
    pub fn cycles(&self) -> u64 {
        self.cpu.total_cycles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_reset_runs_nop_for_four_cycles() {
        let rom = vec![0x00; 0x8000];
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        let cycles = state.cpu_step().unwrap();
        assert_eq!(cycles, 4);
        assert_eq!(state.cpu.pc, 1);
    }

    #[test]
    fn ld_bc_d16_loads_both_bytes() {
        let mut rom = vec![0x00; 0x8000];
        rom[0] = 0x01;
        rom[1] = 0x34;
        rom[2] = 0x12;
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        let cycles = state.cpu_step().unwrap();
        assert_eq!(state.cpu.b, 0x12);
        assert_eq!(state.cpu.c, 0x34);
        assert_eq!(state.cpu.pc, 3);
        assert_eq!(cycles, 12);
    }

    #[test]
    fn interrupt_dispatch_clears_ime_and_if_and_jumps_to_vector() {
        let rom = vec![0x00; 0x8000];
        let mut state = State::new(rom);
        state.cpu.pc = 0x0150;
        state.cpu.ime = true;
        state.memory_bus.write_byte(0xFFFF, 0x01);
        state.memory_bus.request_interrupt(0);

        let cycles = state.cpu_step().unwrap();

        assert_eq!(cycles, 20);
        assert!(!state.cpu.ime);
        assert_eq!(state.memory_bus.read_byte(0xFF0F) & 0x01, 0);
        assert_eq!(state.cpu.pc, 0x40);
        assert_eq!(state.cpu.sp(), 0xFFFE - 2);
    }

    #[test]
    fn cb_prefixed_instruction_advances_pc_past_the_sub_opcode() {
        let mut rom = vec![0x00; 0x8000];
        rom[0] = 0xCB;
        rom[1] = 0x37; // SWAP A
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        state.cpu.a = 0x12;

        state.cpu_step().unwrap();

        assert_eq!(state.cpu.pc, 2);
        assert_eq!(state.cpu.a, 0x21);
    }

    #[test]
    fn ei_enables_ime_on_the_same_step() {
        let mut rom = vec![0x00; 0x8000];
        rom[0] = 0xFB; // EI
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        state.cpu.ime = false;

        state.cpu_step().unwrap();

        assert!(state.cpu.ime);
    }

    #[test]
    fn halt_wakes_when_if_changes_even_without_a_matching_enable_bit() {
        let mut rom = vec![0x00; 0x8000];
        rom[0] = 0x76; // HALT
        rom[1] = 0x00; // NOP
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        state.memory_bus.write_byte(0xFFFF, 0x00); // IE: nothing enabled

        state.cpu_step().unwrap();
        assert!(state.cpu.halted);

        state.memory_bus.request_interrupt(2); // unrelated, unenabled bit
        state.cpu_step().unwrap();

        assert!(!state.cpu.halted);
        assert_eq!(state.cpu.pc, 2);
    }

    #[test]
    fn full_frame_drives_exactly_one_vblank() {
        let mut rom = vec![0x00; 0x8000];
        rom[0] = 0x18;
        rom[1] = 0xFE; // JR -2: spin in place
        let mut state = State::new(rom);
        state.cpu.pc = 0;
        state.memory_bus.set_io_reg_direct(0xFF40, 0x80);

        let mut vblank_calls = 0;
        let mut cycles_run = 0u64;
        while cycles_run < 70_224 {
            let consumed = state.cpu_step().unwrap();
            for _ in 0..consumed {
                state.ppu_step(|_| vblank_calls += 1);
            }
            cycles_run += consumed as u64;
        }
        assert_eq!(vblank_calls, 1);
    }
}
