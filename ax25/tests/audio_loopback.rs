use ax25::{
    Address, AddressField, Ax25Link, ControlField, Frame, LinkLayer, Pid, ReceivedFrame,
    RepeaterPath, UFrameType,
};
use modem::{Afsk1200, Afsk1200Config, Demodulator};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::mpsc;

fn modem_at(sample_rate: u32) -> Afsk1200 {
    Afsk1200::new(Afsk1200Config {
        sample_rate,
        ..Afsk1200Config::default()
    })
    .unwrap()
}

fn position_report() -> Frame {
    Frame::ui(
        "APRS".parse().unwrap(),
        "N0CALL-9".parse().unwrap(),
        "!4903.50N/07201.75W-Test 001234",
    )
    .via(RepeaterPath::new(vec!["WIDE1-1".parse().unwrap(), "WIDE2-2".parse().unwrap()]).unwrap())
}

fn connect_request() -> Frame {
    let mut address = AddressField::new(
        Address::new("N0CALL", 2).unwrap(),
        Address::new("K1AB", 0).unwrap(),
    );
    address.set_command_response(ax25::CommandResponse::Command);
    Frame {
        address,
        control: ControlField::UFrame {
            code: UFrameType::SABM,
            pf: true,
        },
        pid: None,
        info: Vec::new(),
        raw: None,
    }
}

fn info_frame() -> Frame {
    Frame {
        control: ControlField::IFrame {
            ns: 3,
            nr: 1,
            pf: false,
        },
        pid: Some(Pid::NoLayer3),
        info: (0..200).map(|i| (i * 7) as u8).collect(),
        ..connect_request()
    }
}

#[test]
fn frame_survives_modem_round_trip() {
    let (tx, rx) = mpsc::channel::<ReceivedFrame>();
    let mut link = Ax25Link::new(tx);
    let mut modulator = modem_at(44_100);
    let mut demodulator = modem_at(44_100);

    let frame = position_report();
    let samples = link.tx_frame(&frame, &mut modulator).unwrap();
    demodulator.demodulate_pcm(&samples, &mut link);

    let received: Vec<ReceivedFrame> = rx.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert!(received[0].valid);
    assert_eq!(received[0].frame, frame);
    assert_eq!(link.stats().frames, 1);
}

#[test]
fn back_to_back_frames_at_common_rates() {
    for sample_rate in [22_050, 44_100, 48_000] {
        let (tx, rx) = mpsc::channel::<ReceivedFrame>();
        let mut link = Ax25Link::new(tx);
        let mut modulator = modem_at(sample_rate);
        let mut demodulator = modem_at(sample_rate);

        let frames = [position_report(), connect_request(), info_frame()];
        let mut samples = Vec::new();
        for frame in &frames {
            samples.extend(link.tx_frame(frame, &mut modulator).unwrap());
        }

        // Uneven chunks, as an audio callback would deliver them.
        for chunk in samples.chunks(441) {
            demodulator.demodulate_pcm(chunk, &mut link);
        }

        let received: Vec<Frame> = rx
            .try_iter()
            .inspect(|r| assert!(r.valid, "{sample_rate} Hz: {:?}", r.error))
            .map(|r| r.frame)
            .collect();
        assert_eq!(received, frames, "{sample_rate} Hz");
    }
}

#[test]
fn frame_survives_additive_noise() {
    let mut rng = StdRng::seed_from_u64(0x0A25);
    let (tx, rx) = mpsc::channel::<ReceivedFrame>();
    let mut link = Ax25Link::new(tx);
    let mut modulator = modem_at(44_100);
    let mut demodulator = modem_at(44_100);

    let frame = position_report();
    let noisy: Vec<f32> = link
        .tx_frame(&frame, &mut modulator)
        .unwrap()
        .iter()
        .map(|&s| 0.5 * f32::from(s) / f32::from(i16::MAX) + rng.gen_range(-0.1..0.1))
        .collect();
    demodulator.demodulate(&noisy, &mut link);

    let valid: Vec<Frame> = rx.try_iter().filter(|r| r.valid).map(|r| r.frame).collect();
    assert_eq!(valid, vec![frame]);
}
