use ax25::{Ax25Link, ReceivedFrame};
use modem::{Afsk1200, Afsk1200Config, BitSink, Demodulator};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::mpsc;

#[test]
fn random_bits_never_yield_a_valid_frame() {
    let mut rng = StdRng::seed_from_u64(42);
    let (tx, rx) = mpsc::channel::<ReceivedFrame>();
    let mut link = Ax25Link::new(tx);

    for _ in 0..200_000 {
        link.rxbit(rng.r#gen::<bool>());
    }

    assert!(rx.try_iter().all(|r| !r.valid));
    let stats = link.stats();
    assert_eq!(stats.frames, stats.checksum_failures);
    // Random bits hit seven ones often enough to lose sync.
    assert!(stats.sync_losses > 0);
}

#[test]
fn audio_noise_never_yields_a_valid_frame() {
    let mut rng = StdRng::seed_from_u64(7);
    let (tx, rx) = mpsc::channel::<ReceivedFrame>();
    let mut link = Ax25Link::new(tx);
    let mut demodulator = Afsk1200::new(Afsk1200Config::default()).unwrap();

    let noise: Vec<f32> = (0..2 * 44_100).map(|_| rng.gen_range(-1.0..1.0)).collect();
    demodulator.demodulate(&noise, &mut link);

    assert!(rx.try_iter().all(|r| !r.valid));
}

#[test]
fn silence_never_yields_a_frame() {
    let (tx, rx) = mpsc::channel::<ReceivedFrame>();
    let mut link = Ax25Link::new(tx);
    let mut demodulator = Afsk1200::new(Afsk1200Config::default()).unwrap();

    demodulator.demodulate(&[0.0; 44_100], &mut link);

    assert_eq!(rx.try_iter().count(), 0);
    assert_eq!(*link.stats(), Default::default());
}
