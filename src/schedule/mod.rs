pub mod schedule;
pub mod scheduler;

#[cfg(test)]
mod tests;
