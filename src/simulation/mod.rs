pub mod random_trip;
