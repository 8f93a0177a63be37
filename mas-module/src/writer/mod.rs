//! MAS song serialization
//!
//! The song is written in one pass with placeholders for the size field
//! and the parapointer table, which are patched once every record's
//! position is known.

mod envelope;
mod marks;
mod pattern_packer;
mod sample;
mod stream;


pub use envelope::encode_envelope_nodes;
pub use marks::mark_patterns;
pub use pattern_packer::pack_pattern;
pub use sample::{write_sample_blob, write_sample_data};
pub use stream::ByteWriter;

use sample::write_sample_record;

use crate::{
    FILLER, Instrument, MAS_ORDER_SLOTS, MAS_VERSION, MasError, MasFlags, Module, ORDER_END,
    ORDER_SKIP, TargetConfig,
};

/// Size of the prefix before the song header
const PREFIX_SIZE: usize = 8;

/// Blob type tag of a song
const TYPE_SONG: u8 = 0;

/// Notemap entry flag for instruments that play one sample everywhere
const NOTEMAP_SINGLE: u16 = 0x8000;

/// Serialize `module` as a MAS song
///
/// With `in_soundbank` set, samples that carry a bank index are written as
/// references and the header announces the soundbank dependency. The
/// module is sanitized and its patterns get their jump-target marks.
pub fn write_mas(
    module: &mut Module,
    config: &TargetConfig,
    in_soundbank: bool,
) -> Result<Vec<u8>, MasError> {
    module.sanitize();
    module.validate()?;
    mark_patterns(module);

    let mut flags = module.flags;
    flags.set(MasFlags::MSL_DEP, in_soundbank);

    let mut w = ByteWriter::new();
    w.write_u32(0);
    w.write_u8(TYPE_SONG);
    w.write_u8(MAS_VERSION);
    w.write_u8(FILLER);
    w.write_u8(FILLER);

    let orders = &module.orders[..module.orders.len().min(MAS_ORDER_SLOTS)];
    let pattern_count = module.patterns.len();

    w.write_u8(orders.len() as u8);
    w.write_u8(module.instruments.len() as u8);
    w.write_u8(module.samples.len() as u8);
    w.write_u8(pattern_count as u8);
    w.write_u8(flags.bits());
    w.write_u8(module.global_volume);
    w.write_u8(module.initial_speed);
    w.write_u8(module.initial_tempo);
    w.write_u8(module.restart_position);
    w.fill(FILLER, 3);

    w.write_bytes(&module.channel_volume);
    w.write_bytes(&module.channel_panning);

    for &order in orders {
        if order < ORDER_SKIP && order as usize >= pattern_count {
            w.write_u8(ORDER_SKIP);
        } else {
            w.write_u8(order);
        }
    }
    w.fill(ORDER_END, MAS_ORDER_SLOTS - orders.len());

    let table = w.position();
    let entries = module.instruments.len() + module.samples.len() + pattern_count;
    w.fill(FILLER, entries * 4);

    let mut pointers = Vec::with_capacity(entries);

    for inst in &module.instruments {
        w.align32();
        pointers.push(w.position() - PREFIX_SIZE);
        write_instrument(&mut w, inst)?;
    }

    for sample in &module.samples {
        w.align32();
        pointers.push(w.position() - PREFIX_SIZE);
        let bank_index = sample.bank_index.filter(|_| in_soundbank);
        write_sample_record(&mut w, sample, bank_index, config)?;
    }

    let empty_volume = module.empty_volume();
    for pattern in &module.patterns {
        pointers.push(w.position() - PREFIX_SIZE);
        w.write_bytes(&pack_pattern(pattern, empty_volume));
    }
    w.align32();

    w.patch_u32(0, (w.position() - PREFIX_SIZE) as u32);
    for (i, pointer) in pointers.into_iter().enumerate() {
        w.patch_u32(table + i * 4, pointer as u32);
    }

    tracing::debug!(
        "MAS '{}': {} instruments, {} samples, {} patterns, {} bytes",
        module.title,
        module.instruments.len(),
        module.samples.len(),
        pattern_count,
        w.position()
    );

    Ok(w.into_inner())
}

fn write_instrument(w: &mut ByteWriter, inst: &Instrument) -> Result<(), MasError> {
    w.write_u8(inst.global_volume);
    w.write_u8(inst.fadeout);
    w.write_u8(inst.random_volume);
    w.write_u8(inst.dct as u8);
    w.write_u8(inst.nna as u8);
    w.write_u8(inst.envelope_flags());
    w.write_u8(inst.setpan);
    w.write_u8(inst.dca as u8);

    let single = inst.uniform_sample();
    match single {
        Some(sample) => w.write_u16(NOTEMAP_SINGLE | sample as u16),
        None => {
            let offset = 12 + inst.envelopes().map(envelope::envelope_size).sum::<usize>();
            w.write_u16(offset as u16);
        }
    }
    w.write_u16(0);

    for env in inst.envelopes() {
        envelope::write_envelope(w, env)?;
    }

    if single.is_none() {
        for &entry in &inst.notemap {
            w.write_u16(entry);
        }
    }

    Ok(())
}
