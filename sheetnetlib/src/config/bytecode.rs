//! Compiled configuration format: a stream of big-endian `i32`
//! tags, each followed by its payload, terminated by tag `0`.
//!
//! Payloads are big-endian `i32` integers (booleans are `1` for
//! true), big-endian IEEE-754 doubles, and strings stored as an
//! `i32` length followed by that many UTF-16 big-endian code units.
//! Tags the decoder doesn't know carry no payload and are skipped.

use crate::prelude::*;

pub const TAG_END: i32 = 0;
pub const TAG_CONFIG_SECTION: i32 = 1;
pub const TAG_INPUT_NODES: i32 = 2;
pub const TAG_OUTPUT_NODES: i32 = 3;
pub const TAG_POPULATION: i32 = 4;
pub const TAG_TRAIN: i32 = 5;
pub const TAG_MIN_RAND: i32 = 6;
pub const TAG_MAX_RAND: i32 = 7;
pub const TAG_ERROR_CUTOFF: i32 = 8;
pub const TAG_MAX_ITERATIONS: i32 = 9;
pub const TAG_PRINT_WEIGHTS: i32 = 10;
pub const TAG_PRINT_TRUTHS: i32 = 11;
pub const TAG_RUN_AFTER_TRAIN: i32 = 12;
pub const TAG_SAVE_WEIGHTS: i32 = 13;
pub const TAG_ACTIVATION: i32 = 14;
pub const TAG_NUM_CASES: i32 = 15;
pub const TAG_LEARNING_RATE: i32 = 16;
pub const TAG_TOPOLOGY: i32 = 17;
pub const TAG_KEEP_ALIVE: i32 = 18;
pub const TAG_WEIGHTS_SECTION: i32 = 19;
pub const TAG_WEIGHTS_FILE: i32 = 20;
pub const TAG_OUTPUT_WEIGHTS_FILE: i32 = 21;
pub const TAG_CASES_SECTION: i32 = 22;
pub const TAG_OUTPUTS_FILE: i32 = 23;
pub const TAG_INPUTS_FILE: i32 = 24;
pub const TAG_SAVE_INTERVAL: i32 = 25;
pub const TAG_SAVE_DISTINCT: i32 = 26;
pub const TAG_SEED: i32 = 27;

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let Some(bytes) = self.bytes.get(self.position..self.position + N) else {
            return Err(Error::MalformedConfig(format!(
                "stream ended at byte {} while reading {what}",
                self.position
            )));
        };

        let mut value = [0; N];

        value.copy_from_slice(bytes);

        self.position += N;

        Ok(value)
    }

    #[inline]
    fn int(&mut self, what: &str) -> Result<i32> {
        self.take(what).map(i32::from_be_bytes)
    }

    fn unsigned(&mut self, what: &str) -> Result<u32> {
        let value = self.int(what)?;

        u32::try_from(value)
            .map_err(|_| Error::MalformedConfig(format!("{what} can't be negative, got {value}")))
    }

    #[inline]
    fn size(&mut self, what: &str) -> Result<usize> {
        self.unsigned(what).map(|value| value as usize)
    }

    #[inline]
    fn boolean(&mut self, what: &str) -> Result<bool> {
        self.int(what).map(|value| value == 1)
    }

    #[inline]
    fn double(&mut self, what: &str) -> Result<f64> {
        self.take(what).map(f64::from_be_bytes)
    }

    #[inline]
    fn long(&mut self, what: &str) -> Result<u64> {
        self.take(what).map(u64::from_be_bytes)
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let length = self.size(what)?;

        let units = (0..length)
            .map(|_| self.take(what).map(u16::from_be_bytes))
            .collect::<Result<Vec<_>>>()?;

        String::from_utf16(&units)
            .map_err(|err| Error::MalformedConfig(format!("{what} is not valid utf-16: {err}")))
    }
}

/// Decode compiled configuration stream.
///
/// Bytes after the end tag are ignored.
pub fn decode(bytes: &[u8]) -> Result<Config> {
    let mut reader = Reader {
        bytes,
        position: 0
    };

    let mut config = Config::default();

    loop {
        let tag = reader.int("tag")?;

        match tag {
            TAG_END => break,

            TAG_CONFIG_SECTION | TAG_WEIGHTS_SECTION | TAG_CASES_SECTION => (),

            TAG_INPUT_NODES | TAG_OUTPUT_NODES => {
                let nodes = reader.int("deprecated nodes count")?;

                tracing::debug!(tag, nodes, "ignoring deprecated nodes count");
            }

            TAG_POPULATION => config.population = Some(reader.int("population")?),
            TAG_TRAIN => config.train = Some(reader.boolean("train")?),
            TAG_MIN_RAND => config.min_rand = Some(reader.double("min_rand")?),
            TAG_MAX_RAND => config.max_rand = Some(reader.double("max_rand")?),
            TAG_ERROR_CUTOFF => config.error_cutoff = Some(reader.double("error_cutoff")?),
            TAG_MAX_ITERATIONS => config.max_iterations = Some(reader.unsigned("max_iterations")?),
            TAG_PRINT_WEIGHTS => config.print_weights = Some(reader.boolean("print_weights")?),
            TAG_PRINT_TRUTHS => config.print_truths = Some(reader.boolean("print_truths")?),
            TAG_RUN_AFTER_TRAIN => config.run_after_train = Some(reader.boolean("run_after_train")?),
            TAG_SAVE_WEIGHTS => config.save_weights = Some(reader.boolean("save_weights")?),
            TAG_ACTIVATION => config.activation = Some(reader.string("activation")?),
            TAG_NUM_CASES => config.num_cases = Some(reader.size("num_cases")?),
            TAG_LEARNING_RATE => config.learning_rate = Some(reader.double("learning_rate")?),

            TAG_TOPOLOGY => {
                let layers = reader.size("topology layers count")?;

                let topology = (0..layers)
                    .map(|_| reader.size("topology layer size"))
                    .collect::<Result<Vec<_>>>()?;

                config.topology = Some(topology);
            }

            TAG_KEEP_ALIVE => config.keep_alive = Some(reader.unsigned("keep_alive")?),
            TAG_WEIGHTS_FILE => config.weights_file = Some(reader.string("weights_file")?),
            TAG_OUTPUT_WEIGHTS_FILE => config.output_weights_file = Some(reader.string("output_weights_file")?),
            TAG_OUTPUTS_FILE => config.outputs_file = Some(reader.string("outputs_file")?),
            TAG_INPUTS_FILE => config.inputs_file = Some(reader.string("inputs_file")?),
            TAG_SAVE_INTERVAL => config.save_interval = Some(reader.unsigned("save_interval")?),
            TAG_SAVE_DISTINCT => config.save_distinct = Some(reader.boolean("save_distinct")?),
            TAG_SEED => config.seed = Some(reader.long("seed")?),

            _ => tracing::debug!(tag, "skipping unknown configuration tag")
        }
    }

    Ok(config)
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>
}

impl Writer {
    #[inline]
    fn tag(&mut self, tag: i32) -> &mut Self {
        self.int(tag)
    }

    #[inline]
    fn int(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());

        self
    }

    #[inline]
    fn size(&mut self, value: usize) -> &mut Self {
        self.int(value.min(i32::MAX as usize) as i32)
    }

    #[inline]
    fn unsigned(&mut self, value: u32) -> &mut Self {
        self.int(value.min(i32::MAX as u32) as i32)
    }

    #[inline]
    fn boolean(&mut self, value: bool) -> &mut Self {
        self.int(value as i32)
    }

    #[inline]
    fn double(&mut self, value: f64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());

        self
    }

    #[inline]
    fn long(&mut self, value: u64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());

        self
    }

    fn string(&mut self, value: &str) -> &mut Self {
        let units = value.encode_utf16().collect::<Vec<_>>();

        self.size(units.len());

        for unit in units {
            self.bytes.extend_from_slice(&unit.to_be_bytes());
        }

        self
    }
}

/// Encode configuration into the compiled stream format.
///
/// Only defined fields are written, grouped into the config,
/// weights and cases sections.
pub fn encode(config: &Config) -> Vec<u8> {
    let mut writer = Writer::default();

    writer.tag(TAG_CONFIG_SECTION);

    if let Some(topology) = &config.topology {
        writer.tag(TAG_TOPOLOGY).size(topology.len());

        for nodes in topology {
            writer.size(*nodes);
        }
    }

    if let Some(value) = config.population {
        writer.tag(TAG_POPULATION).int(value);
    }

    if let Some(value) = config.train {
        writer.tag(TAG_TRAIN).boolean(value);
    }

    if let Some(value) = config.min_rand {
        writer.tag(TAG_MIN_RAND).double(value);
    }

    if let Some(value) = config.max_rand {
        writer.tag(TAG_MAX_RAND).double(value);
    }

    if let Some(value) = config.error_cutoff {
        writer.tag(TAG_ERROR_CUTOFF).double(value);
    }

    if let Some(value) = config.max_iterations {
        writer.tag(TAG_MAX_ITERATIONS).unsigned(value);
    }

    if let Some(value) = config.print_weights {
        writer.tag(TAG_PRINT_WEIGHTS).boolean(value);
    }

    if let Some(value) = config.print_truths {
        writer.tag(TAG_PRINT_TRUTHS).boolean(value);
    }

    if let Some(value) = config.run_after_train {
        writer.tag(TAG_RUN_AFTER_TRAIN).boolean(value);
    }

    if let Some(value) = config.save_weights {
        writer.tag(TAG_SAVE_WEIGHTS).boolean(value);
    }

    if let Some(value) = &config.activation {
        writer.tag(TAG_ACTIVATION).string(value);
    }

    if let Some(value) = config.num_cases {
        writer.tag(TAG_NUM_CASES).size(value);
    }

    if let Some(value) = config.learning_rate {
        writer.tag(TAG_LEARNING_RATE).double(value);
    }

    if let Some(value) = config.keep_alive {
        writer.tag(TAG_KEEP_ALIVE).unsigned(value);
    }

    if let Some(value) = config.save_interval {
        writer.tag(TAG_SAVE_INTERVAL).unsigned(value);
    }

    if let Some(value) = config.save_distinct {
        writer.tag(TAG_SAVE_DISTINCT).boolean(value);
    }

    if let Some(value) = config.seed {
        writer.tag(TAG_SEED).long(value);
    }

    writer.tag(TAG_WEIGHTS_SECTION);

    if let Some(value) = &config.weights_file {
        writer.tag(TAG_WEIGHTS_FILE).string(value);
    }

    if let Some(value) = &config.output_weights_file {
        writer.tag(TAG_OUTPUT_WEIGHTS_FILE).string(value);
    }

    writer.tag(TAG_CASES_SECTION);

    if let Some(value) = &config.inputs_file {
        writer.tag(TAG_INPUTS_FILE).string(value);
    }

    if let Some(value) = &config.outputs_file {
        writer.tag(TAG_OUTPUTS_FILE).string(value);
    }

    writer.tag(TAG_END);

    writer.bytes
}

#[test]
fn test_decode_every_tag() -> anyhow::Result<()> {
    let mut writer = Writer::default();

    writer.tag(TAG_CONFIG_SECTION)
        .tag(TAG_INPUT_NODES).int(2)
        .tag(TAG_OUTPUT_NODES).int(2)
        .tag(TAG_POPULATION).int(2)
        .tag(TAG_TRAIN).int(0)
        .tag(TAG_MIN_RAND).double(-0.5)
        .tag(TAG_MAX_RAND).double(0.5)
        .tag(TAG_ERROR_CUTOFF).double(1e-3)
        .tag(TAG_MAX_ITERATIONS).int(5000)
        .tag(TAG_PRINT_WEIGHTS).int(1)
        .tag(TAG_PRINT_TRUTHS).int(0)
        .tag(TAG_RUN_AFTER_TRAIN).int(7)
        .tag(TAG_SAVE_WEIGHTS).int(1)
        .tag(TAG_ACTIVATION).string("tangent")
        .tag(TAG_NUM_CASES).int(4)
        .tag(TAG_LEARNING_RATE).double(0.25)
        .tag(TAG_TOPOLOGY).int(3).int(2).int(5).int(2)
        .tag(TAG_KEEP_ALIVE).int(100)
        .tag(TAG_WEIGHTS_SECTION)
        .tag(TAG_WEIGHTS_FILE).string("in.bin")
        .tag(TAG_OUTPUT_WEIGHTS_FILE).string("out.bin")
        .tag(TAG_CASES_SECTION)
        .tag(TAG_OUTPUTS_FILE).string("outputs.bin")
        .tag(TAG_INPUTS_FILE).string("inputs.bin")
        .tag(TAG_SAVE_INTERVAL).int(1000)
        .tag(TAG_SAVE_DISTINCT).int(1)
        .tag(TAG_SEED).long(u64::MAX)
        .tag(TAG_END);

    let config = decode(&writer.bytes)?;

    assert_eq!(config, Config {
        learning_rate: Some(0.25),
        topology: Some(vec![2, 5, 2]),
        population: Some(2),
        train: Some(false),
        min_rand: Some(-0.5),
        max_rand: Some(0.5),
        error_cutoff: Some(1e-3),
        max_iterations: Some(5000),
        print_weights: Some(true),
        print_truths: Some(false),
        run_after_train: Some(false),
        save_weights: Some(true),
        activation: Some(String::from("tangent")),
        num_cases: Some(4),
        keep_alive: Some(100),
        weights_file: Some(String::from("in.bin")),
        output_weights_file: Some(String::from("out.bin")),
        outputs_file: Some(String::from("outputs.bin")),
        inputs_file: Some(String::from("inputs.bin")),
        save_interval: Some(1000),
        save_distinct: Some(true),
        seed: Some(u64::MAX)
    });

    // Encoder writes the same fields back.
    assert_eq!(decode(&encode(&config))?, config);

    Ok(())
}

#[test]
fn test_decode_unknown_tags() -> anyhow::Result<()> {
    let mut writer = Writer::default();

    writer.tag(99)
        .tag(TAG_NUM_CASES).int(8)
        .tag(-3)
        .tag(TAG_ACTIVATION).string("Σigmoid")
        .tag(TAG_END)
        .tag(TAG_NUM_CASES);

    let config = decode(&writer.bytes)?;

    assert_eq!(config.num_cases, Some(8));
    assert_eq!(config.activation.as_deref(), Some("Σigmoid"));
    assert_eq!(config.train, None);

    assert_eq!(decode(&TAG_END.to_be_bytes())?, Config::default());

    Ok(())
}

#[test]
fn test_decode_malformed() {
    // No end tag.
    let mut writer = Writer::default();

    writer.tag(TAG_TRAIN).int(1);

    assert!(matches!(decode(&writer.bytes), Err(Error::MalformedConfig(_))));

    // Payload cut in the middle.
    let mut writer = Writer::default();

    writer.tag(TAG_LEARNING_RATE).double(0.3).tag(TAG_END);

    assert!(matches!(decode(&writer.bytes[..8]), Err(Error::MalformedConfig(_))));

    // Topology shorter than announced.
    let mut writer = Writer::default();

    writer.tag(TAG_TOPOLOGY).int(3).int(2).int(2);

    assert!(matches!(decode(&writer.bytes), Err(Error::MalformedConfig(_))));

    // String longer than the stream.
    let mut writer = Writer::default();

    writer.tag(TAG_INPUTS_FILE).int(10).int(0);

    assert!(matches!(decode(&writer.bytes), Err(Error::MalformedConfig(_))));

    // Negative sizes.
    let mut writer = Writer::default();

    writer.tag(TAG_NUM_CASES).int(-4).tag(TAG_END);

    assert!(matches!(decode(&writer.bytes), Err(Error::MalformedConfig(_))));

    // Lone surrogate.
    let mut writer = Writer::default();

    writer.tag(TAG_ACTIVATION).int(1);
    writer.bytes.extend_from_slice(&0xD800u16.to_be_bytes());
    writer.tag(TAG_END);

    assert!(matches!(decode(&writer.bytes), Err(Error::MalformedConfig(_))));

    assert!(decode(&[]).is_err());
}
