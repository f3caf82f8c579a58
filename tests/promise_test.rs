mod common;

#[cfg(test)]
mod tests {
    use super::common::{init_test_logging, Expectation};
    use promise_future::{Future, Outcome, Promise};
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
        thread,
        time::Duration,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MyError {
        message: String,
    }

    fn my_error(message: &str) -> MyError {
        MyError {
            message: message.into(),
        }
    }

    fn successful_future<T: Clone + Send + 'static>(value: T) -> Future<T, MyError> {
        let promise = Promise::new();
        let producer = promise.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.resolve(value);
        });
        promise.future()
    }

    fn failure_future<T: Clone + Send + 'static>(error: MyError) -> Future<T, MyError> {
        let promise = Promise::new();
        let producer = promise.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.reject(error);
        });
        promise.future()
    }

    #[test]
    fn test_map() {
        init_test_logging();
        let expectation1 = Expectation::new("test map");
        let expectation2 = Expectation::new("test map, inverted");

        let f2 = successful_future("zeeString").map(|value| value.len());
        f2.on_success(expectation1.fulfiller());
        f2.on_failure(expectation2.fulfiller());

        assert_eq!(expectation1.wait(), "zeeString".len());
        expectation2.wait_inverted();
    }

    #[test]
    fn test_map_failure() {
        init_test_logging();
        let expectation1 = Expectation::<usize>::new("test map failure, inverted");
        let expectation2 = Expectation::new("test map failure");

        let f1: Future<String, MyError> = failure_future(my_error("zeeErrorMessage"));
        let f2 = f1.map(|value| value.len());
        f2.on_success(expectation1.fulfiller());
        f2.on_failure(expectation2.fulfiller());

        expectation1.wait_inverted();
        assert_eq!(expectation2.wait().message, "zeeErrorMessage");
    }

    #[test]
    fn test_map_on_settled_promises() {
        let doubled = Promise::<i32, MyError>::resolved(5).map(|x| x * 2);
        assert_eq!(doubled.outcome(), Outcome::Success(10));

        let error = my_error("e");
        let failed = Promise::<i32, MyError>::rejected(error.clone()).map(|x| x * 2);
        assert_eq!(failed.outcome(), Outcome::Failure(error));
    }

    #[test]
    fn test_flat_map() {
        init_test_logging();
        let expectation1 = Expectation::new("test flatMap");
        let expectation2 = Expectation::new("test flatMap, inverted");

        let f2 = successful_future(String::from("zeeString"))
            .flat_map(|first| successful_future(first.clone() + &first));
        f2.on_success(expectation1.fulfiller());
        f2.on_failure(expectation2.fulfiller());

        assert_eq!(expectation1.wait(), "zeeStringzeeString");
        expectation2.wait_inverted();
    }

    #[test]
    fn test_flat_map_first_future_fails() {
        init_test_logging();
        let expectation1 = Expectation::<String>::new("test flatMap failure, inverted");
        let expectation2 = Expectation::new("test flatMap failure");
        let inner_built = Arc::new(AtomicUsize::new(0));

        let counter = inner_built.clone();
        let f1: Future<String, MyError> = failure_future(my_error("zeeErrorMessage"));
        let f2 = f1.flat_map(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            successful_future(String::from("zeeString"))
        });
        f2.on_success(expectation1.fulfiller());
        f2.on_failure(expectation2.fulfiller());

        expectation1.wait_inverted();
        assert_eq!(expectation2.wait().message, "zeeErrorMessage");
        assert_eq!(inner_built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flat_map_second_future_fails() {
        init_test_logging();
        let expectation1 = Expectation::<String>::new("test flatMap success, inverted");
        let expectation2 = Expectation::new("test flatMap failure");

        let f2 = successful_future(String::from("zeeString"))
            .flat_map(|_| failure_future::<String>(my_error("zeeErrorMessage")));
        f2.on_success(expectation1.fulfiller());
        f2.on_failure(expectation2.fulfiller());

        expectation1.wait_inverted();
        assert_eq!(expectation2.wait().message, "zeeErrorMessage");
    }

    #[test]
    fn test_future_init_with_success() {
        let expectation1 = Expectation::new("test future init with success");
        let expectation2 = Expectation::new("test future init with success, inverted");

        let f1: Future<String, MyError> =
            Promise::<String, MyError>::resolved(String::from("zeeValue")).into();
        f1.on_success(expectation1.fulfiller());
        f1.on_failure(expectation2.fulfiller());

        assert_eq!(expectation1.wait(), "zeeValue");
        expectation2.wait_inverted();
    }

    #[test]
    fn test_future_init_with_failure() {
        let expectation1 = Expectation::<String>::new("test future init with failure, inverted");
        let expectation2 = Expectation::new("test future init with failure");

        let f1: Future<String, MyError> =
            Promise::<String, MyError>::rejected(my_error("zeeErrorMessage")).into();
        f1.on_success(expectation1.fulfiller());
        f1.on_failure(expectation2.fulfiller());

        expectation1.wait_inverted();
        assert_eq!(expectation2.wait().message, "zeeErrorMessage");
    }

    #[test]
    fn test_no_cross_branch_firing_before_and_after() {
        let promise = Promise::<u8, MyError>::new();
        let before = Expectation::<MyError>::new("failure registered before, inverted");
        promise.on_failure(before.fulfiller());
        promise.resolve(1);
        let after = Expectation::<MyError>::new("failure registered after, inverted");
        promise.on_failure(after.fulfiller());

        before.wait_inverted();
        after.wait_inverted();
    }

    #[test]
    fn test_concurrent_settlement_has_one_winner() {
        init_test_logging();
        const PRODUCERS: usize = 16;

        for _ in 0..20 {
            let promise = Promise::<usize, usize>::new();
            let successes = Arc::new(AtomicUsize::new(0));
            let failures = Arc::new(AtomicUsize::new(0));
            let barrier = Arc::new(Barrier::new(PRODUCERS * 2));

            let mut handles = Vec::new();
            for id in 0..PRODUCERS {
                let producer = promise.clone();
                let barrier_p = barrier.clone();
                handles.push(thread::spawn(move || {
                    barrier_p.wait();
                    if id % 2 == 0 {
                        producer.try_resolve(id).is_ok()
                    } else {
                        producer.try_reject(id).is_ok()
                    }
                }));

                let consumer = promise.future();
                let (successes, failures) = (successes.clone(), failures.clone());
                let barrier_c = barrier.clone();
                handles.push(thread::spawn(move || {
                    barrier_c.wait();
                    consumer
                        .on_success(move |_| {
                            successes.fetch_add(1, Ordering::SeqCst);
                        })
                        .on_failure(move |_| {
                            failures.fetch_add(1, Ordering::SeqCst);
                        });
                    false
                }));
            }

            let winners = handles
                .into_iter()
                .map(|handle| handle.join().expect("a test thread has panicked"))
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);

            let (successes, failures) = (
                successes.load(Ordering::SeqCst),
                failures.load(Ordering::SeqCst),
            );
            match promise.outcome() {
                Outcome::Success(id) => {
                    assert_eq!(id % 2, 0);
                    assert_eq!((successes, failures), (PRODUCERS, 0));
                }
                Outcome::Failure(id) => {
                    assert_eq!(id % 2, 1);
                    assert_eq!((successes, failures), (0, PRODUCERS));
                }
                Outcome::Pending => panic!("no producer settled the promise"),
            }
        }
    }

    #[test]
    fn test_chain_settled_from_another_thread() {
        let promise = Promise::<u32, MyError>::new();
        let done = Expectation::new("chained result");
        promise
            .map(|x| x + 1)
            .flat_map(|x| Future::resolved(x.to_string()))
            .on_success(done.fulfiller());

        let producer = promise.clone();
        thread::spawn(move || producer.resolve(41))
            .join()
            .expect("The producer thread has panicked");
        assert_eq!(done.wait(), "42");
    }
}
