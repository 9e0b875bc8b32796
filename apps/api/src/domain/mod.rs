// Domain layer module exports
// Ticket types are independent of the trigger transport and the agents

pub mod ticket;
