#[cfg(test)]
mod multi_thread_tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::time::{Duration, Instant};

    use simple_queue::SynchronizedQueue;
    use test_support::utils::{backoff, message_for, parse_message_id};

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    /**
     * N threads each push one distinct value at the same moment; afterwards the queue holds
     * exactly those N values.
     */
    fn concurrent_pushes_are_not_lost() {
        let num_threads = 16;
        let queue = SynchronizedQueue::new();
        let barrier = Barrier::new(num_threads);

        std::thread::scope(|s| {
            for i in 0..num_threads {
                let queue = &queue;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    queue.push(message_for(i as u32));
                });
            }
        });

        assert_eq!(queue.len(), num_threads);

        let mut seen = HashSet::new();
        for _ in 0..num_threads {
            let message = queue.pop().expect("queue drained early");
            assert!(seen.insert(parse_message_id(&message)), "duplicate: {message}");
        }
        assert_eq!(queue.pop(), None);
        assert_eq!(seen, (0..num_threads as u32).collect());
    }

    #[test]
    /**
     * Multiple producers and multiple consumers spinning on a shared queue. Every id is
     * produced once and must be consumed exactly once.
     */
    fn multi_produce_consume_test() {
        let num_producers: u32 = 4;
        let num_consumers: u32 = 4;
        let max_messages: u32 = 20_000;

        let queue = Arc::new(SynchronizedQueue::<String>::new());
        let produce_counter = Arc::new(AtomicU32::new(0));
        let received_ids = Arc::new(Mutex::new(HashSet::<u32>::new()));
        let received_count = Arc::new(AtomicUsize::new(0));

        let deadline = Instant::now() + TIMEOUT;
        std::thread::scope(|s| {
            for i in 0..num_consumers {
                let builder = std::thread::Builder::new().name(format!("consumer_{i}"));
                let queue = Arc::clone(&queue);
                let received_ids = Arc::clone(&received_ids);
                let received_count = Arc::clone(&received_count);
                builder
                    .spawn_scoped(s, move || {
                        let mut backoff_pow = 0;
                        while received_count.load(Ordering::Acquire) < max_messages as usize {
                            match queue.pop() {
                                Some(message) => {
                                    let id = parse_message_id(&message);
                                    assert!(id < max_messages, "received id out of range: {id}");
                                    assert!(
                                        received_ids.lock().unwrap().insert(id),
                                        "duplicate message received: {message}"
                                    );
                                    received_count.fetch_add(1, Ordering::AcqRel);
                                    backoff_pow = 0;
                                }
                                None => backoff(&mut backoff_pow),
                            }

                            if Instant::now() > deadline {
                                panic!("test timed out after {TIMEOUT:?}");
                            }
                        }
                    })
                    .unwrap();
            }

            for i in 0..num_producers {
                let builder = std::thread::Builder::new().name(format!("producer_{i}"));
                let queue = Arc::clone(&queue);
                let counter = Arc::clone(&produce_counter);
                builder
                    .spawn_scoped(s, move || {
                        let mut id = counter.fetch_add(1, Ordering::AcqRel);
                        while id < max_messages {
                            queue.push(message_for(id));
                            id = counter.fetch_add(1, Ordering::AcqRel);
                        }
                    })
                    .unwrap();
            }
        });

        assert!(produce_counter.load(Ordering::Acquire) >= max_messages);
        assert!(queue.is_empty());
        assert_eq!(queue.waiting_consumer_count(), 0);

        let received_ids = received_ids.lock().unwrap();
        assert_eq!(received_ids.len(), max_messages as usize);
        for i in 0..max_messages {
            assert!(received_ids.contains(&i), "missing received id: {i}");
        }
    }

    #[test]
    /**
     * With one consumer, items from any single producer must come out in the order that
     * producer pushed them, however the producers interleave.
     */
    fn per_producer_order_is_preserved() {
        let num_producers: usize = 4;
        let per_producer: usize = 5_000;
        let queue = SynchronizedQueue::new();

        let mut drained = Vec::with_capacity(num_producers * per_producer);
        let deadline = Instant::now() + TIMEOUT;
        std::thread::scope(|s| {
            for producer in 0..num_producers {
                let queue = &queue;
                s.spawn(move || {
                    for seq in 0..per_producer {
                        queue.push((producer, seq));
                    }
                });
            }

            let mut backoff_pow = 0;
            while drained.len() < num_producers * per_producer {
                match queue.pop() {
                    Some(item) => {
                        drained.push(item);
                        backoff_pow = 0;
                    }
                    None => backoff(&mut backoff_pow),
                }
                assert!(Instant::now() < deadline, "test timed out after {TIMEOUT:?}");
            }
        });

        let mut next_seq = vec![0; num_producers];
        for (producer, seq) in drained {
            assert_eq!(seq, next_seq[producer], "producer {producer} reordered");
            next_seq[producer] += 1;
        }
        assert!(next_seq.iter().all(|&n| n == per_producer));
        assert!(queue.is_empty());
    }

    #[test]
    fn len_stays_consistent_under_contention() {
        let num_threads = 8;
        let rounds = 2_000;
        let queue = SynchronizedQueue::new();

        std::thread::scope(|s| {
            for _ in 0..num_threads {
                let queue = &queue;
                s.spawn(move || {
                    for i in 0..rounds {
                        queue.push(i);
                        // every thread pushes before it pops, so a pop never finds the queue empty
                        assert!(queue.pop().is_some());
                    }
                });
            }
        });

        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_races_with_pushes_without_corruption() {
        let queue = SynchronizedQueue::new();
        let pushed = 10_000;

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..pushed {
                    queue.push(i);
                }
            });
            s.spawn(|| {
                for _ in 0..100 {
                    queue.clear();
                    std::thread::yield_now();
                }
            });
        });

        // whatever survived the clears is a strictly increasing tail of the pushes
        let survivors: Vec<_> = queue.into_inner().into_iter().collect();
        assert!(survivors.len() <= pushed);
        assert!(survivors.windows(2).all(|w| w[0] + 1 == w[1]));
        if let Some(&last) = survivors.last() {
            assert_eq!(last, pushed - 1);
        }
    }
}
