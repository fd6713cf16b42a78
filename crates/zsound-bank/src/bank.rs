//! Bank description document.
//!
//! Turns a [`BankLayout`] into the address-annotated tree consumed by the
//! bank packer: one instrument splitting up to three samples, one drum per
//! sample, a shared envelope and per-sample descriptors, codebooks and loop
//! records.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::document::{
    format_float, to_xml_string, write_xml, ArrayLen, Element, Field, Item, Node, PointerTarget,
    Section, StructNode,
};
use crate::error::ZsoundResult;
use crate::layout::{BankLayout, LoopRecord, SampleDescriptorBits, CODEC_ADPCM, MEDIUM_RAM};
use crate::predictor::PREDICTOR_GROUP_LEN;
use crate::sample::SampleRecord;

/// ADPCM predictor order written to every codebook.
pub const PREDICTOR_ORDER: i32 = 2;

/// Instruments per bank.
pub const NUM_INSTRUMENTS: u32 = 1;

/// Shared amplitude envelope, as (time, amplitude) points plus the
/// terminating control pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Envelope {
    pub attack_time: i16,
    pub attack_amplitude: i16,
    pub hold_time: i16,
    pub hold_amplitude: i16,
    pub decay_time: i16,
    pub sustain_amplitude: i16,
    pub control_flow: i16,
    pub control_value: i16,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_time: 2,
            attack_amplitude: 32700,
            hold_time: 1,
            hold_amplitude: 32700,
            decay_time: 32700,
            sustain_amplitude: 29430,
            control_flow: -1,
            control_value: 0,
        }
    }
}

/// Bank-wide settings that do not depend on the samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BankOptions {
    /// Bank address written to the index entry.
    pub audiobank_address: u32,
    /// Audio storage medium id.
    pub storage_medium: u8,
    /// Cache load type id.
    pub cache_load_type: u8,
    /// Primary and secondary sample table numbers.
    pub sample_bank_ids: [u8; 2],
    /// Release decay index for the instrument and every drum.
    pub decay_index: u8,
    /// Drum pan (64 is centre).
    pub drum_pan: u8,
    pub envelope: Envelope,
}

impl Default for BankOptions {
    fn default() -> Self {
        Self {
            audiobank_address: 155648,
            storage_medium: 2,
            cache_load_type: 2,
            sample_bank_ids: [0, 255],
            decay_index: 245,
            drum_pan: 64,
            envelope: Envelope::default(),
        }
    }
}

/// File name for a bank description: `{name}_BANK.{extension}`.
pub fn bank_file_name(name: &str, extension: &str) -> String {
    format!("{}_BANK.{}", name, extension)
}

/// A laid-out bank and its description tree.
#[derive(Debug, Clone)]
pub struct BankDocument {
    layout: BankLayout,
    root: Node,
}

impl BankDocument {
    /// Lays out `samples` and builds the description.
    pub fn build(samples: &[SampleRecord], options: &BankOptions) -> ZsoundResult<Self> {
        let layout = BankLayout::compute(samples)?;
        let root = build_tree(&layout, options);
        Ok(Self { layout, root })
    }

    pub fn layout(&self) -> &BankLayout {
        &self.layout
    }

    /// Root `bank` node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total bank size in bytes, for the caller's placement metadata.
    pub fn total_size(&self) -> u32 {
        self.layout.bank_length()
    }

    pub fn to_xml_string(&self) -> String {
        to_xml_string(&self.root)
    }

    pub fn write_xml<W: Write>(&self, writer: &mut W) -> ZsoundResult<()> {
        write_xml(&self.root, writer)?;
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root)
    }

    /// BLAKE3 hex digest of the XML rendering.
    pub fn content_hash(&self) -> String {
        blake3::hash(self.to_xml_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

fn build_tree(layout: &BankLayout, options: &BankOptions) -> Node {
    let count = layout.len();

    let root = Section::new("bank")
        .attr("NUM_INST", NUM_INSTRUMENTS)
        .attr("NUM_DRUM", count)
        .attr("NUM_SFX", 0)
        .attr("ATnum", 0)
        .child(Section::new("abindexentry").child(index_entry(layout, options)))
        .child(Section::new("abheader").child(StructNode::new("ABHeader")))
        .child(Section::new("abbank").child(bank_header(layout)))
        .child(
            Section::new("abdrumlist")
                .attr("address", layout.bases().drumlist)
                .child(drum_list(layout)),
        )
        .child(Section::new("absfxlist"))
        .child(Section::new("instruments").child(instrument(layout, options)))
        .child(per_sample("drums", count, |i| drum(layout, options, i)))
        .child(Section::new("envelopes").child(envelope(layout, &options.envelope)))
        .child(per_sample("samples", count, |i| sample(layout, i)))
        .child(per_sample("aladpcmbooks", count, |i| codebook(layout, i)))
        .child(per_sample("aladpcmloops", count, |i| loop_record(layout, i)));

    Node::Section(root)
}

fn per_sample(tag: &str, count: usize, build: impl Fn(usize) -> Item) -> Section {
    Section::new(tag).children((0..count).map(|i| Node::Item(build(i))))
}

fn target(ptrto: &str, index: usize) -> PointerTarget {
    PointerTarget {
        ptrto: ptrto.to_string(),
        index: index as i32,
    }
}

fn null_target(ptrto: &str) -> PointerTarget {
    PointerTarget {
        ptrto: ptrto.to_string(),
        index: -1,
    }
}

fn index_entry(layout: &BankLayout, options: &BankOptions) -> StructNode {
    let defaults = BankOptions::default();
    let [bank_id_1, bank_id_2] = options.sample_bank_ids;

    StructNode::new("ABIndexentry")
        .field(Field::scalar(
            "Audiobank Address",
            "uint32",
            "Ptr Bank (in Audiobank)",
            options.audiobank_address,
        ))
        .field(Field::scalar("Bank Size", "uint32", "Bank Length", layout.bank_length()))
        .field(
            Field::scalar("Audio Storage Medium", "uint8", "None", options.storage_medium)
                .default_val(defaults.storage_medium),
        )
        .field(
            Field::scalar("Cache Load Type", "uint8", "None", options.cache_load_type)
                .default_val(defaults.cache_load_type),
        )
        .field(
            Field::scalar("Sample Bank ID 1", "uint8", "Sample Table Number", bank_id_1)
                .default_val(defaults.sample_bank_ids[0]),
        )
        .field(
            Field::scalar("Sample Bank ID 2", "uint8", "Sample Table Number", bank_id_2)
                .default_val(defaults.sample_bank_ids[1]),
        )
        .field(Field::scalar("NUM_INST", "uint8", "NUM_INST", NUM_INSTRUMENTS))
        .field(Field::scalar("NUM_DRUM", "uint8", "NUM_DRUM", layout.len()))
        .field(Field::scalar("NUM_SFX", "uint16", "NUM_SFX", 0))
}

fn bank_header(layout: &BankLayout) -> StructNode {
    StructNode::new("ABBank")
        .field(Field::pointer(
            "Drum List Pointer",
            "Ptr Drum List",
            layout.bases().drumlist,
            target("ABDrumList", 0),
        ))
        .field(Field::pointer(
            "SFX List Pointer",
            "Ptr SFX List",
            0,
            null_target("ABSFXList"),
        ))
        .field(
            Field::array(
                "Instrument List",
                "uint32",
                "List of Ptrs to Insts",
                ArrayLen::Var("NUM_INST".into()),
            )
            .of_pointers("ABInstrument")
            .element(Element::pointer(
                layout.bases().instrument,
                target("ABInstrument", 0),
            )),
        )
}

fn drum_list(layout: &BankLayout) -> StructNode {
    StructNode::new("ABDrumList").field(
        Field::array(
            "Drum List",
            "uint32",
            "List of Ptrs to Drums",
            ArrayLen::Var("NUM_DRUM".into()),
        )
        .of_pointers("ABDrum")
        .elements(
            (0..layout.len()).map(|i| Element::pointer(layout.drum_addr(i), target("ABDrum", i))),
        ),
    )
}

/// An `ABSound`: sample pointer plus tuning. `None` is an empty slot.
fn sound(
    layout: &BankLayout,
    slot: Option<usize>,
    tuning: fn(&SampleRecord) -> f32,
) -> StructNode {
    let (address, pointer_target, tune) = match slot {
        Some(i) => (
            layout.sample_addr(i),
            target("ABSample", i),
            tuning(&layout.samples()[i]),
        ),
        None => (0, null_target("ABSample"), 0.0),
    };

    StructNode::new("ABSound")
        .field(Field::pointer("Sample Pointer", "Ptr Sample", address, pointer_target))
        .field(Field::scalar("Sample Tuning", "float32", "None", format_float(tune)))
}

fn envelope_pointer(layout: &BankLayout) -> Field {
    Field::pointer(
        "Envelope Pointer",
        "Ptr Envelope",
        layout.bases().envelope,
        target("ABEnvelope", 0),
    )
}

fn instrument(layout: &BankLayout, options: &BankOptions) -> Item {
    let split = layout.split();
    let primary = &layout.samples()[split.primary];

    let body = StructNode::new("ABInstrument")
        .field(Field::scalar("Relocated (Bool)", "uint8", "None", 0))
        .field(Field::scalar(
            "Key Region Low (Max Range)",
            "uint8",
            "Split Point 1",
            split.key_region_low,
        ))
        .field(Field::scalar(
            "Key Region High (Min Range)",
            "uint8",
            "Split Point 2",
            split.key_region_high,
        ))
        .field(Field::scalar("Decay Index", "uint8", "None", options.decay_index))
        .field(envelope_pointer(layout))
        .field(
            Field::array(
                "Sample Pointer Array",
                "ABSound",
                "List of 3 Sounds for Splits",
                ArrayLen::Fixed(3),
            )
            .elements(
                [split.low, Some(split.primary), split.high]
                    .into_iter()
                    .map(|slot| Element::inline(sound(layout, slot, SampleRecord::chan_tune))),
            ),
        );

    Item::new(
        layout.bases().instrument,
        format!("{} [0]", primary.name()),
        body,
    )
}

fn drum(layout: &BankLayout, options: &BankOptions, index: usize) -> Item {
    let body = StructNode::new("ABDrum")
        .field(Field::scalar("Decay Index", "uint8", "None", options.decay_index))
        .field(Field::scalar("Pan", "uint8", "None", options.drum_pan))
        .field(Field::scalar("Relocated (Bool)", "uint8", "None", 0))
        .field(Field::scalar("Padding Byte", "uint8", "None", 0))
        .field(Field::inline(
            "Drum Sound",
            sound(layout, Some(index), SampleRecord::key_tune),
            "Drum Sound",
        ))
        .field(envelope_pointer(layout));

    Item::new(
        layout.drum_addr(index),
        format!("{} [{}]", layout.samples()[index].name(), index),
        body,
    )
}

fn envelope(layout: &BankLayout, envelope: &Envelope) -> Item {
    let points = [
        ("Attack Time", envelope.attack_time),
        ("Attack Amplitude", envelope.attack_amplitude),
        ("Hold Time", envelope.hold_time),
        ("Hold Amplitude", envelope.hold_amplitude),
        ("Decay Time", envelope.decay_time),
        ("Sustain Amplitude", envelope.sustain_amplitude),
        ("Control Flow", envelope.control_flow),
        ("Control Value", envelope.control_value),
    ];
    let body = points
        .into_iter()
        .fold(StructNode::new("ABEnvelope"), |body, (name, value)| {
            body.field(Field::scalar(name, "int16", "None", value))
        });

    Item::new(layout.bases().envelope, "General Use Envelope", body)
}

fn codec_name(codec: u8) -> &'static str {
    match codec {
        CODEC_ADPCM => "ADPCM",
        _ => "other",
    }
}

fn medium_name(medium: u8) -> &'static str {
    match medium {
        MEDIUM_RAM => "RAM",
        _ => "other",
    }
}

fn descriptor_comment(bits: &SampleDescriptorBits) -> String {
    [
        "Sample descriptor bitfield, most significant bit first:".to_string(),
        " 1 bit   reserved     0".to_string(),
        format!(" 3 bits  codec        {} ({})", codec_name(bits.codec), bits.codec),
        format!(" 2 bits  medium       {} ({})", medium_name(bits.medium), bits.medium),
        format!(" 1 bit   cached       {} ({})", bits.cached, u8::from(bits.cached)),
        format!(" 1 bit   relocated    {} ({})", bits.relocated, u8::from(bits.relocated)),
        format!("24 bits  binary size  {}", bits.size),
    ]
    .join("\n")
}

fn sample(layout: &BankLayout, index: usize) -> Item {
    let record = &layout.samples()[index];
    let bits = layout.descriptor(index);

    let body = StructNode::new("ABSample")
        .comment(descriptor_comment(bits))
        .field(Field::scalar("Bitfield", "uint32", "None", bits.pack()))
        .field(
            Field::scalar(
                "Audiotable Address",
                "uint32",
                "Sample Address (in Sample Table)",
                record.temp_addr().value(),
            )
            .refers_to("ATSample"),
        )
        .field(Field::pointer(
            "Loop Pointer",
            "Ptr ALADPCMLoop",
            layout.loop_addr(index),
            target("ALADPCMLoop", index),
        ))
        .field(Field::pointer(
            "Book Pointer",
            "Ptr ALADPCMBook",
            layout.codebook_addr(index),
            target("ALADPCMBook", index),
        ));

    Item::new(
        layout.sample_addr(index),
        format!("{} [{}]", record.name(), index),
        body,
    )
}

fn int16_array(values: &[i16]) -> Field {
    Field::array("data", "int16", "None", ArrayLen::Fixed(PREDICTOR_GROUP_LEN))
        .elements(values.iter().map(|v| Element::value("int16", v)))
}

fn codebook(layout: &BankLayout, index: usize) -> Item {
    let record = &layout.samples()[index];
    let groups = record.codebook();

    let body = StructNode::new("ALADPCMBook")
        .attr("NUM_PRED", groups.len())
        .field(Field::scalar("Order", "int32", "None", PREDICTOR_ORDER))
        .field(Field::scalar(
            "Number of Predictors",
            "int32",
            "NUM_PRED",
            groups.len(),
        ))
        .field(
            Field::array(
                "Codebook",
                "ALADPCMPredictor",
                "Array of Predictors",
                ArrayLen::Var("NUM_PRED".into()),
            )
            .elements(groups.iter().map(|group| {
                Element::inline(StructNode::new("ALADPCMPredictor").field(int16_array(group)))
            })),
        );

    Item::new(
        layout.codebook_addr(index),
        format!("{} Book [{}]", record.name(), index),
        body,
    )
}

fn loop_record(layout: &BankLayout, index: usize) -> Item {
    let record = &layout.samples()[index];
    let LoopRecord {
        start,
        end,
        count,
        sample_count,
        tail,
    } = layout.loop_record(index);
    let has_tail = layout.loop_record(index).has_tail();

    let mut loopbook = Field::array(
        "Loopbook",
        "ALADPCMTail",
        "Tail Data (if Loop Start != 0)",
        ArrayLen::Var("HAS_TAIL".into()),
    );
    if has_tail {
        let tail = StructNode::new("ALADPCMTail").field(int16_array(tail));
        loopbook = loopbook.element(Element::inline(tail));
    }

    let body = StructNode::new("ALADPCMLoop")
        .attr("HAS_TAIL", u8::from(has_tail))
        .field(Field::scalar("Loop Start", "uint32", "Loop Start", start))
        .field(Field::scalar(
            "Loop End (Sample Length if Count = 0)",
            "uint32",
            "Loop End",
            end,
        ))
        .field(Field::scalar("Loop Count", "int32", "Loop Count", count).default_val(-1))
        .field(Field::scalar("Number of Samples", "uint32", "None", sample_count))
        .field(loopbook);

    Item::new(
        layout.loop_addr(index),
        format!("{} Loop [{}]", record.name(), index),
        body,
    )
}
