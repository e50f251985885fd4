pub mod dual;
pub mod gumbel;
