//! Property tests: FIFO delivery and batch-drain correctness

use fx_plumbing::{ capacity_for, RingBuffer };
use proptest::prelude::*;

/// One step of a single-threaded schedule
#[derive(Debug, Clone)]
enum Step {
    Write(u32),
    ReadNext,
    ReadAll,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => any::<u32>().prop_map(Step::Write),
        1 => Just(Step::ReadNext),
        1 => Just(Step::ReadAll)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_capacity_is_largest_power_of_two_below(requested in 1usize..1 << 20) {
        let capacity = capacity_for(requested);
        prop_assert!(capacity.is_power_of_two());
        prop_assert!(capacity <= requested);
        prop_assert!(capacity * 2 > requested);
    }

    #[test]
    fn prop_fifo_single_reader(values in prop::collection::vec(any::<i64>(), 0..2_000)) {
        let ring = RingBuffer::<i64>::with_capacity(64).unwrap();
        let mut reader = ring.register_reader().unwrap();
        let mut writer = ring.register_writer().unwrap();
        ring.seal().unwrap();

        let to_write = values.clone();
        let producer = std::thread::spawn(move || {
            for value in to_write {
                writer.write(value);
            }
        });

        let received: Vec<i64> = (0..values.len()).map(|_| reader.read_next()).collect();
        producer.join().unwrap();
        prop_assert_eq!(received, values);
    }

    /// Any interleaving of writes and drains that respects capacity
    /// reproduces the written sequence for every reader.
    #[test]
    fn prop_interleaved_drains(
        requested in 1usize..64,
        steps in prop::collection::vec(step(), 0..400)
    ) {
        let ring = RingBuffer::<u32>::with_capacity(requested).unwrap();
        let mut batch_reader = ring.register_reader().unwrap();
        let mut single_reader = ring.register_reader().unwrap();
        let mut writer = ring.register_writer().unwrap();
        ring.seal().unwrap();

        let mut written = Vec::new();
        let mut batched = Vec::new();
        let mut singles = Vec::new();

        for step in steps {
            match step {
                Step::Write(value) => {
                    if writer.try_write(value).is_err() {
                        // Full: free space the way a live reader would
                        if batch_reader.available() > 0 {
                            batch_reader.read_all(&mut batched);
                        }
                        while let Some(v) = single_reader.try_read_next() {
                            singles.push(v);
                        }
                        prop_assert!(writer.try_write(value).is_ok());
                    }
                    written.push(value);
                    prop_assert!(ring.writer_cursor() - ring.reader_gate() <= ring.capacity() as u64);
                }
                Step::ReadNext => {
                    if let Some(v) = single_reader.try_read_next() {
                        singles.push(v);
                    }
                }
                Step::ReadAll => {
                    if batch_reader.available() > 0 {
                        let before = batched.len();
                        let drained = batch_reader.read_all(&mut batched);
                        prop_assert_eq!(batched.len() - before, drained);
                    }
                }
            }
        }

        if batch_reader.available() > 0 {
            batch_reader.read_all(&mut batched);
        }
        while let Some(v) = single_reader.try_read_next() {
            singles.push(v);
        }

        prop_assert_eq!(&batched, &written);
        prop_assert_eq!(&singles, &written);
        prop_assert_eq!(ring.reader_gate(), ring.writer_cursor());
    }
}
