mod capacity;
mod packet_rate;

pub use self::{
    capacity::{Capacity, CapacityError},
    packet_rate::{PacketRate, PacketRateParseError},
};
