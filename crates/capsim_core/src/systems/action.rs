use crate::bacterium::Bacterium;
use crate::config::AppConfig;
use crate::environment::Environment;

pub struct ActionContext<'a> {
    pub config: &'a AppConfig,
    pub env: &'a mut Environment,
    pub dt: f64,
}

/// Lifetime bookkeeping and the environment response of every bacterium.
///
/// Runs sequentially: behaviors read and write shared fields, so the order in
/// which cells consume is the population order.
pub fn action_system(bacteria: &mut [Bacterium], ctx: ActionContext) {
    let growth = &ctx.config.growth;
    for b in bacteria.iter_mut() {
        b.lifetime += 1;
        b.advance_asymmetry(growth.asymmetry_length, growth.sym_growth, ctx.dt);
        if let Some(behavior) = ctx.config.behavior_of(b.species) {
            behavior.act(b, &mut ctx.env.fields, ctx.dt);
        }
    }
}
