mod admin;
mod helpers;
mod menu;
mod mocks;
mod mounting;
mod orders;
mod payments;
