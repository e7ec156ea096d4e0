//! A multi-producer, multi-consumer push-pop example using SynchronizedQueue
//!
//! Producers push tagged messages, consumers poll with backoff until every message has been
//! seen exactly once. Run with `--features tracing` and `-v` to watch queue events.

use clap::Parser;
use simple_queue::SynchronizedQueue;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use test_support::utils::{backoff, message_for, parse_message_id};

/// A multi-producer, multi-consumer push-pop example using SynchronizedQueue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Total number of messages to push
    #[arg(short = 'n', long, default_value = "100000")]
    msg_count: u32,

    /// Timeout in seconds for producer/consumer loops
    #[arg(short = 't', long, default_value = "10")]
    timeout_secs: u64,

    /// Number of producer threads
    #[arg(short = 'p', long, default_value = "2")]
    producer_threads: u16,

    /// Number of consumer threads
    #[arg(short = 'c', long, default_value = "2")]
    consumer_threads: u16,

    /// Enable verbose logging (needs the `tracing` feature)
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn warn_for_thread_counts(args: &Args) {
    let available_cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let total_threads = args.producer_threads as usize + args.consumer_threads as usize;

    if total_threads > available_cpus {
        eprintln!(
            "Warning: total thread count ({total_threads}) exceeds available CPUs ({available_cpus})",
        );
    }
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        if cfg!(feature = "tracing") {
            simple_queue::trace::init_tracing();
        } else {
            eprintln!("Note: --verbose has no effect without `--features tracing`");
        }
    }

    warn_for_thread_counts(&args);

    if args.producer_threads == 0 {
        panic!("At least one producer thread is required");
    }

    if args.consumer_threads == 0 {
        panic!("At least one consumer thread is required");
    }

    println!("Starting mpmc push-pop run with:");
    println!("  Total messages: {}", args.msg_count);
    println!("  Producer threads: {}", args.producer_threads);
    println!("  Consumer threads: {}", args.consumer_threads);
    println!("  Simple queue version: {}", simple_queue::VERSION);

    let queue = SynchronizedQueue::<String>::new();
    let consumed_count = AtomicU32::new(0);
    let received = Mutex::new(HashSet::with_capacity(args.msg_count as usize));
    let stop = AtomicBool::new(false);
    let barrier = Barrier::new(args.producer_threads as usize + args.consumer_threads as usize + 1);

    let producer_thread_count = args.producer_threads as u32;
    let base_messages_per_thread = args.msg_count / producer_thread_count;
    let extra_messages = args.msg_count % producer_thread_count;

    let msg_count = args.msg_count;
    let mut elapsed = Duration::ZERO;
    thread::scope(|s| {
        let mut next_index = 0u32;

        for thread_idx in 0..producer_thread_count {
            let extra = u32::from(thread_idx < extra_messages);
            let range = next_index..next_index + base_messages_per_thread + extra;
            next_index = range.end;

            let (queue, barrier) = (&queue, &barrier);
            s.spawn(move || {
                barrier.wait();
                for id in range {
                    queue.push(message_for(id));
                }
            });
        }

        for consumer_idx in 0..args.consumer_threads {
            let (queue, barrier, stop) = (&queue, &barrier, &stop);
            let (consumed_count, received) = (&consumed_count, &received);
            s.spawn(move || {
                barrier.wait();
                let mut backoff_pow = 0;
                while consumed_count.load(Ordering::Acquire) < msg_count
                    && !stop.load(Ordering::Relaxed)
                {
                    match queue.pop() {
                        Some(message) => {
                            let id = parse_message_id(&message);
                            if !received.lock().unwrap().insert(id) {
                                panic!("consumer {consumer_idx} saw duplicate message {message}");
                            }
                            consumed_count.fetch_add(1, Ordering::AcqRel);
                            backoff_pow = 0;
                        }
                        None => backoff(&mut backoff_pow),
                    }
                }
            });
        }

        // timer: release everyone together and enforce the timeout
        barrier.wait();
        let start = Instant::now();
        let deadline = start + Duration::from_secs(args.timeout_secs);
        while consumed_count.load(Ordering::Acquire) < msg_count && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        stop.store(true, Ordering::Relaxed);
        elapsed = start.elapsed();
    });

    let consumed = consumed_count.load(Ordering::Acquire);
    if consumed < args.msg_count {
        eprintln!(
            "Timed out after {}s: consumed {consumed} of {} messages ({} still queued)",
            args.timeout_secs,
            args.msg_count,
            queue.len()
        );
        std::process::exit(1);
    }

    let secs = elapsed.as_secs_f64();
    println!("Consumed {consumed} messages in {elapsed:?}");
    if secs > 0.0 {
        println!("Throughput: {:.0} msgs/s", consumed as f64 / secs);
    }
    println!("Queue empty at exit: {}", queue.is_empty());
}
