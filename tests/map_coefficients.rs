mod common;

use nalgebra::{DMatrix, DVector};
use starmap::prelude::*;

#[test]
fn test_single_column_dimensions_and_reset() {
    let map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
    assert_eq!(map.ny(), 9);
    assert_eq!(map.nu(), 3);
    assert_eq!(map.n(), 9);

    let mut expected = DMatrix::zeros(9, 1);
    expected[(0, 0)] = 1.0;
    assert_eq!(map.y(), expected);
    assert_eq!(map.u(), DVector::from_vec(vec![-1.0, 0.0, 0.0]));
}

#[test]
fn test_single_column_round_trip() {
    let mut map: Map<Single, Emitted> = Map::new(2, 2).unwrap();

    map.set(&YlmIndex::new(1, Selector::All), vec![0.1, 0.2, 0.3])
        .unwrap();
    assert_eq!(
        map.get(&YlmIndex::new(1, Selector::All)).unwrap(),
        Coefficients::from(vec![0.1, 0.2, 0.3])
    );
    assert_eq!(
        map.get(&YlmIndex::new(1, 1)).unwrap(),
        Coefficients::Scalar(0.3)
    );

    // Explicit lists keep the caller's order
    map.set(&YlmIndex::new(2, vec![2_i64, -2]), vec![5.0, 6.0]).unwrap();
    assert_eq!(map.get(&YlmIndex::new(2, -2)).unwrap(), Coefficients::Scalar(6.0));
    assert_eq!(map.get(&YlmIndex::new(2, 2)).unwrap(), Coefficients::Scalar(5.0));

    // Broadcast
    map.set(&YlmIndex::new(2, Selector::All), 0.5).unwrap();
    assert_eq!(map.get(&YlmIndex::new(2, Selector::All)).unwrap().to_vec(), vec![0.5; 5]);
}

#[test]
fn test_wildcard_ordering() {
    let mut map: Map<Single, Emitted> = Map::new(2, 0).unwrap();
    let values: Vec<f64> = (0..9).map(|v| v as f64).collect();
    map.set(&YlmIndex::all(), values.clone()).unwrap();
    assert_eq!(map.get(&YlmIndex::all()).unwrap().to_vec(), values);
    assert_eq!(map.y().column(0).iter().copied().collect::<Vec<_>>(), values);
}

#[test]
fn test_rejected_writes_leave_store_unchanged() {
    let mut map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
    map.set(&YlmIndex::new(1, Selector::All), vec![0.1, 0.2, 0.3])
        .unwrap();
    let before = map.y();

    assert_eq!(
        map.set(&YlmIndex::new(1, Selector::All), vec![1.0, 2.0]),
        Err(StarmapError::ShapeMismatch {
            expected: (3, 1),
            found: (2, 1)
        })
    );
    assert!(matches!(
        map.set(&YlmIndex::new(3, 0), 1.0),
        Err(StarmapError::IndexOutOfRange { name: "l", .. })
    ));
    assert!(matches!(
        map.set(&YlmIndex::new(1, 2), 1.0),
        Err(StarmapError::IndexOutOfRange { name: "m", .. })
    ));
    assert_eq!(map.y(), before);
}

#[test]
fn test_empty_selectors_are_rejected() {
    let no_values = Vec::<i64>::new;

    let mut temporal: Map<Temporal, Emitted> = Map::temporal(1, 2, 3).unwrap();
    let before = temporal.y();
    let idx = YlmIndex::new(1, 0).col(no_values());
    assert!(matches!(temporal.get(&idx), Err(StarmapError::EmptySelection(_))));
    assert!(matches!(temporal.set(&idx, 1.0), Err(StarmapError::EmptySelection(_))));
    assert!(matches!(
        temporal.set(&YlmIndex::new(1, no_values()), 1.0),
        Err(StarmapError::EmptySelection(_))
    ));
    assert_eq!(temporal.y(), before);

    let u_before = temporal.u();
    assert!(matches!(temporal.get_u(no_values()), Err(StarmapError::EmptySelection(_))));
    assert!(matches!(
        temporal.set_u(no_values(), 0.5),
        Err(StarmapError::EmptySelection(_))
    ));
    assert_eq!(temporal.u(), u_before);

    let mut spectral: Map<Spectral, Emitted> = Map::spectral(1, 0, 2).unwrap();
    let before = spectral.y();
    let idx = YlmIndex::new(Selector::All, Selector::All).col(no_values());
    assert!(matches!(spectral.get(&idx), Err(StarmapError::EmptySelection(_))));
    assert!(matches!(spectral.set(&idx, 1.0), Err(StarmapError::EmptySelection(_))));
    assert_eq!(spectral.y(), before);
}

#[test]
fn test_per_degree_wildcard_matches_ascending_orders() {
    let mut single = random_single(4);
    let mut spectral: Map<Spectral, Emitted> = Map::spectral(4, 0, 3).unwrap();
    spectral.random(&[0.0, 1.0, 0.5, 0.25, 0.125], Some(4), None).unwrap();

    for l in 0..=4_i64 {
        let manual: Vec<f64> = (-l..=l)
            .flat_map(|m| single.get(&YlmIndex::new(l, m)).unwrap().to_vec())
            .collect();
        assert_eq!(single.get(&YlmIndex::new(l, Selector::All)).unwrap().to_vec(), manual);

        let manual: Vec<f64> = (-l..=l)
            .flat_map(|m| spectral.get(&YlmIndex::new(l, m)).unwrap().to_vec())
            .collect();
        assert_eq!(spectral.get(&YlmIndex::new(l, Selector::All)).unwrap().to_vec(), manual);
    }

    // Writing through the per-degree wildcard lands in ascending m
    single.set(&YlmIndex::new(2, Selector::All), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    for (m, v) in (-2..=2_i64).zip(1..) {
        assert_eq!(single.get(&YlmIndex::new(2, m)).unwrap(), Coefficients::Scalar(v as f64));
    }
}

fn random_single(ydeg: usize) -> Map<Single, Emitted> {
    let mut map: Map<Single, Emitted> = Map::new(ydeg, 0).unwrap();
    let power: Vec<f64> = (0..=ydeg).map(|l| 1.0 / (1.0 + l as f64)).collect();
    map.random(&power, Some(17), None).unwrap();
    map
}

/// Write distinct values everywhere, then read them back one `(l, m)` at a time.
fn assert_every_coefficient_round_trips<L: Layout>(mut map: Map<L, Reflected>) {
    let ny = map.ny();
    let ncols = map.n() / ny;
    let values = DMatrix::from_fn(ny, ncols, |i, j| 0.5 + i as f64 + 100.0 * j as f64);
    map.set(&YlmIndex::all(), values.clone()).unwrap();
    assert_eq!(
        map.get(&YlmIndex::all()).unwrap().to_vec(),
        values.transpose().iter().copied().collect::<Vec<_>>()
    );

    let ydeg = map.ydeg() as i64;
    let mut row = 0;
    for l in 0..=ydeg {
        for m in -l..=l {
            let expected: Vec<f64> = values.row(row).iter().copied().collect();
            assert_eq!(map.get(&YlmIndex::new(l, m)).unwrap().to_vec(), expected);
            row += 1;
        }
    }
    assert_eq!(row, ny);
}

#[test]
fn test_reflected_round_trip_every_layout() {
    assert_every_coefficient_round_trips(Map::<Single, Reflected>::new(3, 0).unwrap());
    assert_every_coefficient_round_trips(Map::<Spectral, Reflected>::spectral(3, 0, 2).unwrap());
    assert_every_coefficient_round_trips(Map::<Temporal, Reflected>::temporal(3, 0, 3).unwrap());
}

#[test]
fn test_limb_darkening_gateway() {
    let mut map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
    map.set_u(1, 0.5).unwrap();
    assert_eq!(map.get_u(1).unwrap(), Coefficients::Scalar(0.5));

    map.set_u(Selector::All, vec![0.4, 0.26]).unwrap();
    assert_eq!(map.get_u(Selector::All).unwrap(), Coefficients::from(vec![0.4, 0.26]));
    assert_eq!(map.u()[0], -1.0);

    // u₀ is not addressable
    assert!(matches!(
        map.set_u(0, 1.0),
        Err(StarmapError::IndexOutOfRange { name: "l", .. })
    ));
    assert_eq!(
        map.set_u(Selector::All, DMatrix::from_element(2, 1, 0.1)),
        Err(StarmapError::InvalidArrayShape)
    );
    assert!(map.set_u(Selector::All, vec![0.1]).is_err());
}

#[test]
fn test_spectral_round_trip() {
    let mut map: Map<Spectral, Emitted> = Map::spectral(1, 0, 3).unwrap();
    assert_eq!(map.y().row(0).iter().copied().collect::<Vec<_>>(), vec![1.0; 3]);

    // Whole row of one coefficient across wavelengths
    map.set(&YlmIndex::new(1, 0), vec![0.1, 0.2, 0.3]).unwrap();
    let read = map.get(&YlmIndex::new(1, 0)).unwrap();
    assert_eq!(read, Coefficients::Matrix(DMatrix::from_row_slice(1, 3, &[0.1, 0.2, 0.3])));

    // One column of several coefficients
    map.set(&YlmIndex::new(1, Selector::All).col(2), vec![1.0, 2.0, 3.0])
        .unwrap();
    let read = map.get(&YlmIndex::new(1, Selector::All).col(2)).unwrap();
    assert_eq!(read, Coefficients::Matrix(DMatrix::from_column_slice(3, 1, &[1.0, 2.0, 3.0])));

    // Full grid
    let grid = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    map.set(&YlmIndex::new(1, Selector::All).col(vec![0_i64, 1]), grid.clone())
        .unwrap();
    assert_eq!(
        map.get(&YlmIndex::new(1, Selector::All).col(vec![0_i64, 1])).unwrap(),
        Coefficients::Matrix(grid)
    );
    assert_eq!(
        map.get(&YlmIndex::new(1, 1).col(1)).unwrap(),
        Coefficients::Scalar(6.0)
    );
}

#[test]
fn test_spectral_shape_errors() {
    let mut map: Map<Spectral, Emitted> = Map::spectral(1, 0, 3).unwrap();
    let before = map.y();
    assert_eq!(
        map.set(&YlmIndex::new(1, Selector::All), vec![1.0, 2.0, 3.0]),
        Err(StarmapError::InvalidArrayShape)
    );
    assert_eq!(
        map.set(&YlmIndex::new(1, 0), vec![1.0, 2.0]),
        Err(StarmapError::ShapeMismatch {
            expected: (1, 3),
            found: (1, 2)
        })
    );
    assert!(matches!(
        map.set(&YlmIndex::new(0, 0).col(3), 1.0),
        Err(StarmapError::IndexOutOfRange { name: "w", .. })
    ));
    assert_eq!(map.y(), before);
}

#[test]
fn test_temporal_round_trip() {
    // ydeg = 1 -> Ny = 4, three Taylor terms
    let mut map: Map<Temporal, Emitted> = Map::temporal(1, 0, 3).unwrap();
    assert_eq!(map.y().shape(), (12, 1));
    assert_eq!(map.get(&YlmIndex::new(0, 0)).unwrap().to_vec(), vec![1.0, 0.0, 0.0]);

    // (l, m) × order, flattened row-major into the stacked blocks
    let values = DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
    map.set(&YlmIndex::new(1, Selector::All).col(vec![0_i64, 1]), values.clone())
        .unwrap();
    let y = map.y();
    assert_eq!(y[(1, 0)], 1.0);
    assert_eq!(y[(3, 0)], 3.0);
    assert_eq!(y[(5, 0)], 10.0);
    assert_eq!(y[(7, 0)], 30.0);
    assert_eq!(
        map.get(&YlmIndex::new(1, Selector::All).col(vec![0_i64, 1])).unwrap(),
        Coefficients::Matrix(values)
    );

    // Positional rank-1 write over the flattened rows
    map.set(&YlmIndex::new(1, 0), vec![7.0, 8.0, 9.0]).unwrap();
    assert_eq!(
        map.get(&YlmIndex::new(1, 0)).unwrap(),
        Coefficients::Matrix(DMatrix::from_row_slice(1, 3, &[7.0, 8.0, 9.0]))
    );

    assert!(map.set(&YlmIndex::new(1, 0), vec![7.0, 8.0]).is_err());
    assert!(map
        .set(&YlmIndex::new(1, 0), DMatrix::from_element(3, 1, 0.0))
        .is_err());
}

#[test]
fn test_reset_restores_canonical_state() {
    let mut map: Map<Temporal, Emitted> = Map::temporal(2, 1, 2).unwrap();
    map.set(&YlmIndex::all(), 3.0).unwrap();
    map.set_u(1, 0.7).unwrap();
    map.reset();

    let y = map.y();
    assert_eq!(y[(0, 0)], 1.0);
    assert_eq!(y.iter().filter(|v| **v != 0.0).count(), 1);
    assert_eq!(map.u(), DVector::from_vec(vec![-1.0, 0.0]));
}

#[test]
fn test_reads_are_detached() {
    let mut map: Map<Single, Emitted> = Map::new(1, 0).unwrap();
    let snapshot = map.y();
    map.set(&YlmIndex::new(1, 0), 0.9).unwrap();
    assert_eq!(snapshot[(2, 0)], 0.0);
    assert_eq!(map.y()[(2, 0)], 0.9);
}

#[test]
fn test_reduced_precision_narrowing() {
    let mut map: Map<Single, Emitted, f32> = Map::new(1, 0).unwrap();
    map.set(&YlmIndex::new(1, 0), 0.1).unwrap();
    let read = map.get(&YlmIndex::new(1, 0)).unwrap().as_scalar().unwrap();
    assert_eq!(read, 0.1_f32 as f64);
}
