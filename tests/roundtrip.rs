use neac::tag::TagId;
use neac::{Decoder, EncodeOptions, Encoder, PcmFormat, Tag};

fn encode_decode(format: PcmFormat, options: EncodeOptions, samples: &[i32]) -> Vec<i32> {
    let mut buf = Vec::new();
    let mut encoder = Encoder::create(&mut buf, format, options, None).unwrap();
    for &s in samples {
        encoder.write_sample(s).unwrap();
    }
    encoder.end_write().unwrap();

    let mut decoder = Decoder::open(&buf[..]).unwrap();
    (0..samples.len()).map(|_| decoder.read_sample().unwrap()).collect()
}

fn xorshift(state: &mut u32) -> u32 {
    *state ^= *state << 13;
    *state ^= *state >> 17;
    *state ^= *state << 5;
    *state
}

// Scenario 1: an all-zero block encodes with a blank partition and decodes
// to all zeros.
#[test]
fn scenario_all_zero_block() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 1,
        total_samples: 1024,
    };
    let options = EncodeOptions {
        block_size: 1024,
        filter_taps: 4,
        use_mid_side: false,
    };
    let samples = vec![0i32; 1024];
    let out = encode_decode(format, options, &samples);
    assert_eq!(out, samples);
}

// Scenario 2: an alternating +-1 signal round-trips exactly.
#[test]
fn scenario_alternating_signal() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 1,
        total_samples: 1024,
    };
    let options = EncodeOptions {
        block_size: 1024,
        filter_taps: 4,
        use_mid_side: false,
    };
    let samples: Vec<i32> = (0..1024).map(|i| if i % 2 == 0 { 1 } else { -1 }).collect();
    let out = encode_decode(format, options, &samples);
    assert_eq!(out, samples);
}

// Scenario 3: stereo sine with R = -L, M/S enabled, round-trips exactly.
#[test]
fn scenario_stereo_sine_mid_side() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 2,
        total_samples: 8192 * 2,
    };
    let options = EncodeOptions {
        block_size: 1024,
        filter_taps: 8,
        use_mid_side: true,
    };
    let mut samples = Vec::with_capacity(8192 * 2);
    for i in 0..8192 {
        let phase = 2.0 * std::f64::consts::PI * 440.0 * (i as f64) / 44_100.0;
        let l = (phase.sin() * 20_000.0).round() as i32;
        samples.push(l);
        samples.push(-l);
    }
    let out = encode_decode(format, options, &samples);
    assert_eq!(out, samples);
}

// Scenario 4: 24-bit mono uniform random noise with the maximum filter
// length round-trips exactly.
#[test]
fn scenario_24bit_random_max_taps() {
    let format = PcmFormat {
        sample_rate: 96_000,
        bits_per_sample: 24,
        channels: 1,
        total_samples: 10_000,
    };
    let options = EncodeOptions {
        block_size: 4096,
        filter_taps: 32,
        use_mid_side: false,
    };
    let mut state = 0xC0FF_EEu32;
    let samples: Vec<i32> = (0..10_000)
        .map(|_| {
            let r = xorshift(&mut state);
            ((r as i32) % (1 << 24)) - (1 << 23)
        })
        .collect();
    let out = encode_decode(format, options, &samples);
    assert_eq!(out, samples);
}

// Scenario 5: a partially filled final block delivers exactly
// `total_samples` samples, after which reads return 0 without advancing.
#[test]
fn scenario_partial_final_block() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 1,
        total_samples: 1500,
    };
    let options = EncodeOptions {
        block_size: 1024,
        filter_taps: 4,
        use_mid_side: false,
    };
    let mut state = 7u32;
    let samples: Vec<i32> = (0..1500).map(|_| (xorshift(&mut state) as i32) % 5000).collect();

    let mut buf = Vec::new();
    let mut encoder = Encoder::create(&mut buf, format, options, None).unwrap();
    for &s in &samples {
        encoder.write_sample(s).unwrap();
    }
    encoder.end_write().unwrap();

    let mut decoder = Decoder::open(&buf[..]).unwrap();
    let out: Vec<i32> = (0..1500).map(|_| decoder.read_sample().unwrap()).collect();
    assert_eq!(out, samples);
    assert_eq!(decoder.read_sample().unwrap(), 0);
    assert_eq!(decoder.read_sample().unwrap(), 0);
}

// Scenario 6: a stream with an unrecognized format version is rejected.
#[test]
fn scenario_version_rejection() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 1,
        total_samples: 16,
    };
    let options = EncodeOptions {
        block_size: 16,
        filter_taps: 0,
        use_mid_side: false,
    };
    let mut buf = Vec::new();
    let mut encoder = Encoder::create(&mut buf, format, options, None).unwrap();
    for i in 0..16 {
        encoder.write_sample(i).unwrap();
    }
    encoder.end_write().unwrap();

    buf[4] = 0xFF;
    let err = Decoder::open(&buf[..]).unwrap_err();
    assert!(matches!(err, neac::Error::MalformedInput(_)));
}

// Universal invariant: lossless round-trip across the full grid of bit
// depths, channel counts, block sizes, filter taps, and M/S settings.
#[test]
fn universal_roundtrip_grid() {
    let mut state = 0xABCDu32;
    for &bits in &[16u8, 24u8] {
        for &channels in &[1u8, 2u8] {
            for &block_size in &[256u16, 1024u16, 4096u16] {
                for &taps in &[0u8, 1, 4, 8, 32] {
                    for &use_mid_side in &[false, true] {
                        let frames = 600usize;
                        let total = frames * channels as usize;
                        let format = PcmFormat {
                            sample_rate: 44_100,
                            bits_per_sample: bits,
                            channels,
                            total_samples: total as u32,
                        };
                        let options = EncodeOptions {
                            block_size,
                            filter_taps: taps,
                            use_mid_side,
                        };
                        let max_magnitude = if bits == 16 { 1 << 15 } else { 1 << 23 };
                        let samples: Vec<i32> = (0..total)
                            .map(|_| ((xorshift(&mut state) as i32) % max_magnitude) - max_magnitude / 2)
                            .collect();
                        let out = encode_decode(format, options, &samples);
                        assert_eq!(
                            out, samples,
                            "bits={} channels={} block_size={} taps={} mid_side={}",
                            bits, channels, block_size, taps, use_mid_side
                        );
                    }
                }
            }
        }
    }
}

// Streaming equivalence: encoding one sample at a time yields the same
// bytes as filling the entire stream before ending it.
#[test]
fn streaming_equivalence() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 2,
        total_samples: 2048,
    };
    let options = EncodeOptions {
        block_size: 512,
        filter_taps: 4,
        use_mid_side: true,
    };
    let mut state = 99u32;
    let samples: Vec<i32> = (0..2048).map(|_| (xorshift(&mut state) as i32) % 10_000).collect();

    let mut buf_a = Vec::new();
    {
        let mut encoder = Encoder::create(&mut buf_a, format, options, None).unwrap();
        for &s in &samples {
            encoder.write_sample(s).unwrap();
        }
        encoder.end_write().unwrap();
    }

    let mut buf_b = Vec::new();
    {
        let mut encoder = Encoder::create(&mut buf_b, format, options, None).unwrap();
        for chunk in samples.chunks(7) {
            for &s in chunk {
                encoder.write_sample(s).unwrap();
            }
        }
        encoder.end_write().unwrap();
    }

    assert_eq!(buf_a, buf_b);
}

// A tag record with both string and numeric entries survives the round
// trip alongside the audio payload.
#[test]
fn tag_roundtrips_alongside_audio() {
    let format = PcmFormat {
        sample_rate: 44_100,
        bits_per_sample: 16,
        channels: 1,
        total_samples: 512,
    };
    let options = EncodeOptions {
        block_size: 512,
        filter_taps: 2,
        use_mid_side: false,
    };
    let mut tag = Tag::new();
    tag.set_text(TagId::Artist, "Test Artist");
    tag.set_text(TagId::Album, "Test Album");
    tag.set_number(TagId::TrackNumber, 3);

    let mut state = 1234u32;
    let samples: Vec<i32> = (0..512).map(|_| (xorshift(&mut state) as i32) % 3000).collect();

    let mut buf = Vec::new();
    let mut encoder = Encoder::create(&mut buf, format, options, Some(tag)).unwrap();
    for &s in &samples {
        encoder.write_sample(s).unwrap();
    }
    encoder.end_write().unwrap();

    let mut decoder = Decoder::open(&buf[..]).unwrap();
    let decoded_tag = decoder.tag().unwrap();
    assert_eq!(decoded_tag.get_text(TagId::Artist), Some("Test Artist"));
    assert_eq!(decoded_tag.get_text(TagId::Album), Some("Test Album"));
    assert_eq!(decoded_tag.get_number(TagId::TrackNumber), Some(3));

    let out: Vec<i32> = (0..512).map(|_| decoder.read_sample().unwrap()).collect();
    assert_eq!(out, samples);
}
