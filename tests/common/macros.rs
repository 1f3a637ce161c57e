/// Asserts that the active population has the expected size.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!(
            $world.population(),
            $count,
            "Population count mismatch at tick {}",
            $world.tick
        );
    };
}

/// Asserts that a bacterium with the given id is no longer active.
#[macro_export]
macro_rules! assert_bacterium_absent {
    ($world:expr, $id:expr) => {
        assert!(
            $world.get($id).is_none(),
            "Bacterium {} should be removed but is still active",
            $id
        );
    };
}

/// Asserts that two floats agree within a tolerance.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $tol,
            "{} and {} differ by more than {}",
            l,
            r,
            $tol
        );
    };
}
