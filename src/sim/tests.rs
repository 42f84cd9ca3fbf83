// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests related to memory-timing simulation

use num_bigint::BigUint;
use num_traits::One;

use crate::context::Context;
use crate::error::Error;
use crate::ident::Named;
use crate::memory::rom::RomConfig;
use crate::memory::{MemoryConfig, WriteSource};
use crate::netlist::MemoryId;
use crate::tests::{input, logging};

use super::{MemorySim, Valuation};


fn wide_open_memory(context: &mut Context, bit: u16, addr: u16) -> MemoryId {
    context
        .declare_memory(
            MemoryConfig::new(bit, addr)
                .expect("invalid config")
                .with_max_read_ports(None)
                .with_max_write_ports(None),
        )
        .expect("could not declare memory")
}


#[test]
fn reads_observe_the_start_of_cycle_state() {
    logging();

    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 8, 4);
    let addr = input("addr", 4);
    let data = input("data", 8);

    context
        .write(mem, &addr, WriteSource::Plain(data), false)
        .expect("could not build write port");
    let out = context.read(mem, &addr).expect("could not build read port");

    let mut sim = MemorySim::new();
    let inputs = Valuation::new().with("addr", 3u64).with("data", 42u64);

    // The write committed in cycle 0 is not visible to cycle 0's read,
    // only to the next cycle's.
    let outputs = sim.step(context.netlist(), &inputs).expect("step failed");
    assert_eq!(outputs[out.name_ref()], 0u8.into());

    let outputs = sim.step(context.netlist(), &inputs).expect("step failed");
    assert_eq!(outputs[out.name_ref()], 42u8.into());
}


#[test]
fn disabled_writes_leave_the_location_untouched() {
    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 8, 4);
    let identity = context.netlist().memory(mem).identity();
    let addr = input("addr", 4);
    let data = input("data", 8);
    let we = input("we", 1);

    context
        .write(mem, &addr, WriteSource::enabled(data, we), false)
        .expect("could not build write port");
    let out = context.read(mem, &addr).expect("could not build read port");

    let mut sim = MemorySim::new();
    sim.preload(identity, 2u64, 7u64);

    for cycle in 0..4u64 {
        let inputs = Valuation::new()
            .with("addr", 2u64)
            .with("data", 90 + cycle)
            .with("we", 0u64);
        let outputs = sim.step(context.netlist(), &inputs).expect("step failed");
        assert_eq!(outputs[out.name_ref()], 7u8.into());
    }
    let store = sim.store(identity).expect("store vanished");
    assert_eq!(store.get(&2u64.into()), 7u8.into());
}


#[test]
fn writes_commit_in_port_registration_order() {
    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 8, 4);
    let identity = context.netlist().memory(mem).identity();
    let addr = input("addr", 4);
    let first = input("first", 8);
    let second = input("second", 8);

    context
        .write(mem, &addr, WriteSource::Plain(first), false)
        .expect("could not build write port");
    context
        .write(mem, &addr, WriteSource::Plain(second), false)
        .expect("could not build write port");

    let mut sim = MemorySim::new();
    let inputs = Valuation::new()
        .with("addr", 5u64)
        .with("first", 1u64)
        .with("second", 2u64);
    sim.step(context.netlist(), &inputs).expect("step failed");

    // Both ports wrote the same address this cycle; the later port wins.
    let store = sim.store(identity).expect("no store");
    assert_eq!(store.get(&5u64.into()), 2u8.into());
}


#[test]
fn storage_is_sparse_with_multi_limb_values() {
    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 128, 40);
    let identity = context.netlist().memory(mem).identity();
    let addr = input("addr", 40);
    let data = input("data", 128);

    context
        .write(mem, &addr, WriteSource::Plain(data), false)
        .expect("could not build write port");
    let out = context.read(mem, &addr).expect("could not build read port");

    let address: BigUint = BigUint::one() << 39;
    let value: BigUint = (BigUint::one() << 100) + 17u8;

    let mut sim = MemorySim::new();
    let inputs = Valuation::new()
        .with("addr", address.clone())
        .with("data", value.clone());
    sim.step(context.netlist(), &inputs).expect("step failed");
    let outputs = sim.step(context.netlist(), &inputs).expect("step failed");

    assert_eq!(outputs[out.name_ref()], value);

    // A 40 bit address space with exactly one populated cell.
    let store = sim.store(identity).expect("no store");
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&address), value);
}


#[test]
fn rom_contents_resolve_identically_every_cycle() {
    let mut context = Context::new();
    let rom = context
        .declare_rom(RomConfig::new(3, 2, vec![4u64, 5, 6, 7]).expect("invalid config"))
        .expect("could not declare rom");
    let addr = input("addr", 2);
    let out = context.read(rom, &addr).expect("could not build read port");

    let mut sim = MemorySim::new();
    let inputs = Valuation::new().with("addr", 2u64);
    for _ in 0..3 {
        let outputs = sim.step(context.netlist(), &inputs).expect("step failed");
        assert_eq!(outputs[out.name_ref()], 6u8.into());
    }
}


#[test]
fn valuations_are_checked() {
    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 8, 4);
    let addr = input("addr", 4);
    context.read(mem, &addr).expect("could not build read port");

    let mut sim = MemorySim::new();
    assert!(matches!(
        sim.step(context.netlist(), &Valuation::new()),
        Err(Error::UnknownSignal(_))
    ));

    let inputs = Valuation::new().with("addr", 16u64);
    assert!(matches!(
        sim.step(context.netlist(), &inputs),
        Err(Error::ValueExceedsWidth{width: 4, ..})
    ));
}


#[quickcheck]
fn written_values_appear_one_cycle_later(value: u64, address: u8) -> bool {
    let mut context = Context::new();
    let mem = wide_open_memory(&mut context, 64, 8);
    let addr = input("addr", 8);
    let data = input("data", 64);

    context
        .write(mem, &addr, WriteSource::Plain(data), false)
        .expect("could not build write port");
    let out = context.read(mem, &addr).expect("could not build read port");

    let mut sim = MemorySim::new();
    let inputs = Valuation::new()
        .with("addr", u64::from(address))
        .with("data", value);

    let same_cycle = sim.step(context.netlist(), &inputs).expect("step failed");
    let next_cycle = sim.step(context.netlist(), &inputs).expect("step failed");
    same_cycle[out.name_ref()] == 0u8.into() && next_cycle[out.name_ref()] == value.into()
}
